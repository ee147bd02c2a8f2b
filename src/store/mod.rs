//! Project Store
//!
//! Single owner of every project, page and panel. Readers get cheap shared snapshots;
//! writers hand the store a pure function of the current snapshot, which it applies
//! under its write lock and then persists in full.

pub mod persistence;

pub use persistence::{MemorySnapshotStore, SledSnapshotStore, SnapshotPersistence};

use crate::error::{ApiError, StorageError};
use crate::project::update::{prepend_project, remove_project, replace_panel};
use crate::project::{Page, Panel, PanelEvent, PanelPatch, Project};
use crate::types::{PanelId, ProjectId};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Immutable view of every project, newest first
pub type Snapshot = Arc<Vec<Arc<Project>>>;

pub struct ProjectStore {
    snapshot: RwLock<Snapshot>,
    persistence: Arc<dyn SnapshotPersistence>,
}

impl ProjectStore {
    /// Load the store from `persistence`.
    ///
    /// A missing, unreadable or malformed record yields an empty store. Panels that
    /// were mid-attempt when the record was written are marked as failed.
    pub fn open(persistence: Arc<dyn SnapshotPersistence>) -> Self {
        let (projects, repaired) = match persistence.load() {
            Ok(Some(bytes)) => match serde_json::from_slice::<Vec<Project>>(&bytes) {
                Ok(projects) => normalize_projects(projects),
                Err(e) => {
                    warn!(error = %e, "Stored project snapshot is malformed, starting empty");
                    (Vec::new(), false)
                }
            },
            Ok(None) => (Vec::new(), false),
            Err(e) => {
                warn!(error = %e, "Failed to read project snapshot, starting empty");
                (Vec::new(), false)
            }
        };

        info!(projects = projects.len(), "Project store loaded");
        let store = Self {
            snapshot: RwLock::new(Arc::new(projects)),
            persistence,
        };
        if repaired {
            info!("Repaired interrupted panels in loaded snapshot");
            store.persist(&store.snapshot());
        }
        store
    }

    /// Store backed only by process memory
    pub fn in_memory() -> Self {
        Self::open(Arc::new(MemorySnapshotStore::new()))
    }

    /// Current snapshot. Never hold on to it across a suspension point when the
    /// value will drive a later write; read again instead.
    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.snapshot.read())
    }

    pub fn project(&self, project_id: &ProjectId) -> Option<Arc<Project>> {
        self.snapshot
            .read()
            .iter()
            .find(|p| p.id == *project_id)
            .cloned()
    }

    pub fn panel(&self, project_id: &ProjectId, panel_id: &PanelId) -> Option<Panel> {
        self.project(project_id)
            .and_then(|project| project.find_panel(panel_id).cloned())
    }

    /// Panel ids of the project's first page, in display order
    pub fn panel_ids(&self, project_id: &ProjectId) -> Option<Vec<PanelId>> {
        self.project(project_id)
            .map(|project| project.primary_panels().iter().map(|p| p.id).collect())
    }

    /// Prepend `project`, resetting every panel to a fresh idle state.
    pub fn create_project(&self, project: Project) -> Result<Arc<Project>, ApiError> {
        let project = Project {
            pages: project
                .pages
                .into_iter()
                .map(|page| Page {
                    id: page.id,
                    panels: page
                        .panels
                        .into_iter()
                        .map(Panel::into_idle)
                        .collect(),
                })
                .collect(),
            ..project
        };
        let project_id = project.id;

        let created = self.commit(|projects| {
            let next = prepend_project(projects, project);
            let created = Arc::clone(&next[0]);
            Ok((next, created))
        })?;
        info!(project_id = %project_id, panels = created.panel_count(), "Project created");
        Ok(created)
    }

    /// Apply a user edit to one panel's caption and/or prompt.
    pub fn update_panel(
        &self,
        project_id: &ProjectId,
        panel_id: &PanelId,
        patch: &PanelPatch,
    ) -> Result<Panel, ApiError> {
        let panel = self.commit(|projects| {
            replace_panel(projects, project_id, panel_id, |panel| Ok(patch.apply(panel)))
        })?;
        debug!(project_id = %project_id, panel_id = %panel_id, "Panel updated");
        Ok(panel)
    }

    /// Drive one panel through the lifecycle state machine.
    pub fn apply_panel_event(
        &self,
        project_id: &ProjectId,
        panel_id: &PanelId,
        event: PanelEvent,
    ) -> Result<Panel, ApiError> {
        let panel = self.commit(|projects| {
            replace_panel(projects, project_id, panel_id, |panel| {
                Ok(panel.apply_event(event)?)
            })
        })?;
        debug!(
            project_id = %project_id,
            panel_id = %panel_id,
            status = %panel.status(),
            "Panel transitioned"
        );
        Ok(panel)
    }

    /// Remove a project. Returns whether it existed.
    pub fn delete_project(&self, project_id: &ProjectId) -> bool {
        let removed = self.commit(|projects| {
            remove_project(projects, project_id)
                .map(|next| (next, ()))
                .ok_or(ApiError::ProjectNotFound(*project_id))
        });
        if removed.is_ok() {
            info!(project_id = %project_id, "Project deleted");
        }
        removed.is_ok()
    }

    /// Apply `f` to the current snapshot under the write lock, publish the result and
    /// persist it. Nothing is published when `f` fails.
    fn commit<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&[Arc<Project>]) -> Result<(Vec<Arc<Project>>, T), ApiError>,
    {
        let mut guard = self.snapshot.write();
        let (next, value) = f(guard.as_slice())?;
        let next: Snapshot = Arc::new(next);
        *guard = Arc::clone(&next);
        self.persist(&next);
        Ok(value)
    }

    /// Push saved snapshots to stable storage. Writes are not flushed individually;
    /// hosts call this once their work is done.
    pub fn flush(&self) {
        if let Err(e) = self.persistence.flush() {
            warn!(error = %e, "Failed to flush project snapshot");
        }
    }

    fn persist(&self, snapshot: &Snapshot) {
        let result = serde_json::to_vec(snapshot.as_slice())
            .map_err(StorageError::from)
            .and_then(|payload| self.persistence.save(&payload));
        if let Err(e) = result {
            warn!(error = %e, "Failed to persist project snapshot");
        }
    }
}

fn normalize_projects(projects: Vec<Project>) -> (Vec<Arc<Project>>, bool) {
    let mut repaired = false;
    let projects = projects
        .into_iter()
        .map(|project| {
            let pages = project
                .pages
                .iter()
                .map(|page| Page {
                    id: page.id,
                    panels: page
                        .panels
                        .iter()
                        .map(|panel| {
                            let normalized = panel.clone().normalized();
                            if normalized != *panel {
                                repaired = true;
                            }
                            normalized
                        })
                        .collect(),
                })
                .collect();
            Arc::new(Project { pages, ..project })
        })
        .collect();
    (projects, repaired)
}
