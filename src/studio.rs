//! Studio
//!
//! The consumer-facing surface: create, regenerate, edit and delete, plus the notion of
//! a currently selected project. Hosts (the CLI, tests) talk to this and never reach
//! into the sequencer or the job client directly.

use crate::error::ApiError;
use crate::project::{Panel, PanelPatch, PanelStatus, Project};
use crate::remote::ImageGenerator;
use crate::sequencer::{BulkSequencer, SequenceReport};
use crate::store::{ProjectStore, Snapshot};
use crate::storyline::StorylineGenerator;
use crate::types::{MangaStyle, PanelId, ProjectId};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

pub struct Studio {
    store: Arc<ProjectStore>,
    storyline: Arc<dyn StorylineGenerator>,
    sequencer: Arc<BulkSequencer>,
    selected: RwLock<Option<ProjectId>>,
}

impl Studio {
    pub fn new(
        store: Arc<ProjectStore>,
        storyline: Arc<dyn StorylineGenerator>,
        generator: Arc<dyn ImageGenerator>,
    ) -> Self {
        let sequencer = Arc::new(BulkSequencer::new(Arc::clone(&store), generator));
        Self {
            store,
            storyline,
            sequencer,
            selected: RwLock::new(None),
        }
    }

    pub fn store(&self) -> &Arc<ProjectStore> {
        &self.store
    }

    pub fn projects(&self) -> Snapshot {
        self.store.snapshot()
    }

    /// Create a project from a premise and generate all of its panels.
    ///
    /// Returns the project as it stands after the run, with the run's report. A project
    /// deleted while its panels were being drawn is returned as it was created; the
    /// report counts the undrawn panels as skipped.
    pub async fn on_create_project(
        &self,
        title: &str,
        premise: &str,
        style: MangaStyle,
    ) -> Result<(Arc<Project>, SequenceReport), ApiError> {
        let created = self.create_project_draft(title, premise, style).await?;
        let report = self.sequencer.generate_all_panels(&created.id).await?;
        let current = match self.store.project(&created.id) {
            Some(current) => current,
            None => {
                info!(project_id = %created.id, "Project deleted before its first run finished");
                created
            }
        };
        Ok((current, report))
    }

    /// Plan, store and select a new project with every panel idle. No image is
    /// generated yet.
    pub async fn create_project_draft(
        &self,
        title: &str,
        premise: &str,
        style: MangaStyle,
    ) -> Result<Arc<Project>, ApiError> {
        let premise = premise.trim();
        if premise.is_empty() {
            return Err(ApiError::InvalidInput("premise cannot be empty".to_string()));
        }

        let storyline = self.storyline.generate_storyline(premise, style).await?;
        if storyline.panels.is_empty() {
            return Err(ApiError::Storyline(format!(
                "no panels planned for premise '{}'",
                premise
            )));
        }
        let title = match title.trim() {
            "" => storyline.title.clone(),
            given => given.to_string(),
        };
        let project = Project::new(title, premise, style, storyline.into_panels());

        let created = self.store.create_project(project)?;
        *self.selected.write() = Some(created.id);
        info!(project_id = %created.id, title = %created.title, style = %style, "Project drafted");
        Ok(created)
    }

    /// Run the bulk sequencer on a background task.
    pub fn spawn_bulk_generation(
        &self,
        project_id: ProjectId,
    ) -> JoinHandle<Result<SequenceReport, ApiError>> {
        let sequencer = Arc::clone(&self.sequencer);
        tokio::spawn(async move { sequencer.generate_all_panels(&project_id).await })
    }

    pub async fn on_regenerate_panel(
        &self,
        project_id: &ProjectId,
        panel_id: &PanelId,
    ) -> Result<PanelStatus, ApiError> {
        self.sequencer.regenerate_panel(project_id, panel_id).await
    }

    /// Edit a panel of the currently selected project.
    pub fn on_update_panel(&self, panel_id: &PanelId, patch: &PanelPatch) -> Result<Panel, ApiError> {
        let project_id = self.selected_project_id().ok_or(ApiError::NoProjectSelected)?;
        self.store.update_panel(&project_id, panel_id, patch)
    }

    /// Delete a project, clearing the selection if it pointed there. Returns whether
    /// the project existed.
    pub fn on_delete_project(&self, project_id: &ProjectId) -> bool {
        let removed = self.store.delete_project(project_id);
        let mut selected = self.selected.write();
        if selected.as_ref() == Some(project_id) {
            *selected = None;
        }
        removed
    }

    pub fn select_project(&self, project_id: &ProjectId) -> Result<(), ApiError> {
        if self.store.project(project_id).is_none() {
            return Err(ApiError::ProjectNotFound(*project_id));
        }
        *self.selected.write() = Some(*project_id);
        Ok(())
    }

    pub fn clear_selection(&self) {
        *self.selected.write() = None;
    }

    pub fn selected_project_id(&self) -> Option<ProjectId> {
        *self.selected.read()
    }

    /// Fresh read of the selected project
    pub fn selected_project(&self) -> Option<Arc<Project>> {
        self.selected_project_id()
            .and_then(|id| self.store.project(&id))
    }
}
