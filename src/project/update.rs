//! Pure snapshot updates.
//!
//! Every function takes the current project list and returns a new one. Projects that
//! are not touched keep their `Arc`; the touched project is rebuilt with only the
//! targeted panel replaced.

use super::{Page, Panel, Project};
use crate::error::ApiError;
use crate::types::{PanelId, ProjectId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// User-editable panel fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelPatch {
    pub caption: Option<String>,
    pub prompt: Option<String>,
}

impl PanelPatch {
    pub fn caption(caption: impl Into<String>) -> Self {
        Self {
            caption: Some(caption.into()),
            prompt: None,
        }
    }

    pub fn prompt(prompt: impl Into<String>) -> Self {
        Self {
            caption: None,
            prompt: Some(prompt.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.caption.is_none() && self.prompt.is_none()
    }

    pub fn apply(&self, panel: &Panel) -> Panel {
        let mut next = panel.clone();
        if let Some(caption) = &self.caption {
            next.caption = caption.clone();
        }
        if let Some(prompt) = &self.prompt {
            next.prompt = prompt.clone();
        }
        next
    }
}

/// New list with `project` at the front.
pub fn prepend_project(projects: &[Arc<Project>], project: Project) -> Vec<Arc<Project>> {
    let mut next = Vec::with_capacity(projects.len() + 1);
    next.push(Arc::new(project));
    next.extend(projects.iter().cloned());
    next
}

/// New list without `project_id`, or `None` when it was not present.
pub fn remove_project(
    projects: &[Arc<Project>],
    project_id: &ProjectId,
) -> Option<Vec<Arc<Project>>> {
    if !projects.iter().any(|p| p.id == *project_id) {
        return None;
    }
    Some(
        projects
            .iter()
            .filter(|p| p.id != *project_id)
            .cloned()
            .collect(),
    )
}

/// Replace one panel with the result of `f` applied to its current value.
///
/// Returns the new list together with the replacement panel.
pub fn replace_panel<F>(
    projects: &[Arc<Project>],
    project_id: &ProjectId,
    panel_id: &PanelId,
    f: F,
) -> Result<(Vec<Arc<Project>>, Panel), ApiError>
where
    F: FnOnce(&Panel) -> Result<Panel, ApiError>,
{
    let position = projects
        .iter()
        .position(|p| p.id == *project_id)
        .ok_or(ApiError::ProjectNotFound(*project_id))?;
    let project = &projects[position];

    let current = project
        .find_panel(panel_id)
        .ok_or(ApiError::PanelNotFound {
            project: *project_id,
            panel: *panel_id,
        })?;
    let replacement = f(current)?;

    let pages = project
        .pages
        .iter()
        .map(|page| {
            if page.panels.iter().any(|panel| panel.id == *panel_id) {
                Page {
                    id: page.id,
                    panels: page
                        .panels
                        .iter()
                        .map(|panel| {
                            if panel.id == *panel_id {
                                replacement.clone()
                            } else {
                                panel.clone()
                            }
                        })
                        .collect(),
                }
            } else {
                page.clone()
            }
        })
        .collect();

    let rebuilt = Project {
        pages,
        ..Project::clone(project)
    };

    let mut next = projects.to_vec();
    next[position] = Arc::new(rebuilt);
    Ok((next, replacement))
}
