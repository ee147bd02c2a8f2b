//! Bulk Sequencer
//!
//! Drives image generation for a project's panels one at a time, in display order.
//! Every attempt follows the same three steps: mark the panel `generating`, await the
//! generator, then resolve the panel from whatever came back. Nothing read before the
//! await is trusted after it; the store is consulted again.

use crate::error::ApiError;
use crate::project::{PanelEvent, PanelStatus};
use crate::remote::ImageGenerator;
use crate::store::ProjectStore;
use crate::types::{PanelId, ProjectId};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Outcome counts of one bulk run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SequenceReport {
    pub completed: usize,
    pub failed: usize,
    /// Panels not attempted, or whose outcome was superseded, because the panel or
    /// project changed underneath the run
    pub skipped: usize,
}

impl SequenceReport {
    pub fn total(&self) -> usize {
        self.completed + self.failed + self.skipped
    }
}

pub struct BulkSequencer {
    store: Arc<ProjectStore>,
    generator: Arc<dyn ImageGenerator>,
}

impl BulkSequencer {
    pub fn new(store: Arc<ProjectStore>, generator: Arc<dyn ImageGenerator>) -> Self {
        Self { store, generator }
    }

    pub fn store(&self) -> &Arc<ProjectStore> {
        &self.store
    }

    /// Generate every panel of the project's first page, strictly in order.
    ///
    /// A failed panel never aborts the run. Deleting the project mid-run ends it; the
    /// remaining panels are reported as skipped.
    pub async fn generate_all_panels(
        &self,
        project_id: &ProjectId,
    ) -> Result<SequenceReport, ApiError> {
        let panel_ids = self
            .store
            .panel_ids(project_id)
            .ok_or(ApiError::ProjectNotFound(*project_id))?;
        info!(project_id = %project_id, panels = panel_ids.len(), "Starting bulk generation");

        let mut report = SequenceReport::default();
        for (index, panel_id) in panel_ids.iter().enumerate() {
            match self.attempt(project_id, panel_id).await {
                Ok(PanelStatus::Completed) => report.completed += 1,
                Ok(PanelStatus::Error) => report.failed += 1,
                Ok(_) => report.skipped += 1,
                Err(ApiError::PanelNotFound { .. }) => {
                    warn!(project_id = %project_id, panel_id = %panel_id, "Panel removed during bulk generation, skipping");
                    report.skipped += 1;
                }
                Err(ApiError::ProjectNotFound(_)) => {
                    warn!(project_id = %project_id, "Project deleted during bulk generation, stopping");
                    report.skipped += panel_ids.len() - index;
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            project_id = %project_id,
            completed = report.completed,
            failed = report.failed,
            skipped = report.skipped,
            "Bulk generation finished"
        );
        Ok(report)
    }

    /// Run one generation attempt for a single panel and return its resulting status.
    pub async fn regenerate_panel(
        &self,
        project_id: &ProjectId,
        panel_id: &PanelId,
    ) -> Result<PanelStatus, ApiError> {
        info!(project_id = %project_id, panel_id = %panel_id, "Regenerating panel");
        self.attempt(project_id, panel_id).await
    }

    async fn attempt(
        &self,
        project_id: &ProjectId,
        panel_id: &PanelId,
    ) -> Result<PanelStatus, ApiError> {
        let project = self
            .store
            .project(project_id)
            .ok_or(ApiError::ProjectNotFound(*project_id))?;
        let style = project.style;
        drop(project);

        let started = self
            .store
            .apply_panel_event(project_id, panel_id, PanelEvent::AttemptStarted)?;
        info!(project_id = %project_id, panel_id = %panel_id, "Panel generation started");

        let image = self
            .generator
            .generate_panel_image(&started.prompt, style)
            .await;
        if image.is_none() {
            error!(project_id = %project_id, panel_id = %panel_id, "Panel generation produced no image");
        }

        match self
            .store
            .apply_panel_event(project_id, panel_id, PanelEvent::AttemptResolved(image))
        {
            Ok(panel) => {
                info!(project_id = %project_id, panel_id = %panel_id, status = %panel.status(), "Panel generation resolved");
                Ok(panel.status())
            }
            Err(ApiError::InvalidTransition(e)) => {
                // A concurrent attempt resolved first.
                warn!(project_id = %project_id, panel_id = %panel_id, reason = %e, "Discarding stale generation result");
                self.store
                    .panel(project_id, panel_id)
                    .map(|panel| panel.status())
                    .ok_or(ApiError::PanelNotFound {
                        project: *project_id,
                        panel: *panel_id,
                    })
            }
            Err(e) => Err(e),
        }
    }
}
