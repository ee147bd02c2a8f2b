//! CLI route: single route table and run context. Dispatches to the studio and
//! presentation.

use crate::cli::help::command_name;
use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_create_result_json, format_create_result_text, format_project_list_json,
    format_project_list_text, format_project_show_json, format_project_show_text,
    format_styles_json, format_styles_text,
};
use crate::config::{ConfigLoader, MangaflowConfig};
use crate::error::{ApiError, StorageError};
use crate::project::{PanelPatch, Project};
use crate::remote::{JobClient, ModelScopeTransport};
use crate::store::{ProjectStore, SledSnapshotStore};
use crate::storyline::TemplateStoryline;
use crate::studio::Studio;
use crate::types::{PanelId, ProjectId};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Runtime context for CLI execution: loaded config and the studio facade.
pub struct RunContext {
    studio: Studio,
    config: MangaflowConfig,
}

impl RunContext {
    /// Load configuration, open the snapshot store and wire the production services.
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = ConfigLoader::load(config_path.as_deref())?;
        config.ensure_valid()?;

        let store_path = config.storage.resolve_store_path()?;
        std::fs::create_dir_all(&store_path).map_err(StorageError::IoError)?;
        let persistence = Arc::new(SledSnapshotStore::new(&store_path)?);
        let store = Arc::new(ProjectStore::open(persistence));
        debug!(store_path = %store_path.display(), "Snapshot store opened");

        let transport = Arc::new(ModelScopeTransport::new(&config.api)?);
        let client = Arc::new(JobClient::new(transport, config.api.poll_settings()));
        let studio = Studio::new(store, Arc::new(TemplateStoryline), client);

        Ok(Self { studio, config })
    }

    /// Context around an already-wired studio.
    pub fn with_studio(studio: Studio, config: MangaflowConfig) -> Self {
        Self { studio, config }
    }

    pub fn studio(&self) -> &Studio {
        &self.studio
    }

    pub fn config(&self) -> &MangaflowConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub async fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        info!(command = command_name(command), "Executing command");
        match command {
            Commands::Create {
                premise,
                title,
                style,
                no_generate,
                format,
            } => {
                let (project, report) = if *no_generate {
                    let draft = self
                        .studio
                        .create_project_draft(title, premise, *style)
                        .await?;
                    (draft, None)
                } else {
                    let (project, report) =
                        self.studio.on_create_project(title, premise, *style).await?;
                    (project, Some(report))
                };
                if format == "json" {
                    format_create_result_json(&project, report.as_ref())
                } else {
                    Ok(format_create_result_text(&project, report.as_ref()))
                }
            }
            Commands::List { format } => {
                let projects = self.studio.projects();
                if format == "json" {
                    format_project_list_json(&projects)
                } else {
                    Ok(format_project_list_text(&projects))
                }
            }
            Commands::Show { project, format } => {
                let project = resolve_project(&self.studio, project)?;
                if format == "json" {
                    format_project_show_json(&project)
                } else {
                    Ok(format_project_show_text(&project))
                }
            }
            Commands::Regenerate { project, panel } => {
                let project = resolve_project(&self.studio, project)?;
                let panel_id = resolve_panel(&project, panel)?;
                let status = self.studio.on_regenerate_panel(&project.id, &panel_id).await?;
                Ok(format!("Panel {} is now {}", panel, status))
            }
            Commands::Edit {
                project,
                panel,
                caption,
                prompt,
            } => {
                let patch = PanelPatch {
                    caption: caption.clone(),
                    prompt: prompt.clone(),
                };
                if patch.is_empty() {
                    return Err(ApiError::InvalidInput(
                        "nothing to change; pass --caption and/or --prompt".to_string(),
                    ));
                }
                let project = resolve_project(&self.studio, project)?;
                let panel_id = resolve_panel(&project, panel)?;
                self.studio.select_project(&project.id)?;
                let updated = self.studio.on_update_panel(&panel_id, &patch)?;
                Ok(format!(
                    "Updated panel {}\n  Caption: {}\n  Prompt:  {}",
                    panel, updated.caption, updated.prompt
                ))
            }
            Commands::Delete { project, yes } => {
                let project = resolve_project(&self.studio, project)?;
                if !yes {
                    use dialoguer::Confirm;
                    let confirmed = Confirm::new()
                        .with_prompt(format!("Delete project '{}'?", project.title))
                        .default(false)
                        .interact()
                        .map_err(|e| {
                            ApiError::ConfigError(format!("Failed to get user input: {}", e))
                        })?;
                    if !confirmed {
                        return Ok("Deletion cancelled".to_string());
                    }
                }
                if self.studio.on_delete_project(&project.id) {
                    Ok(format!("Deleted project: {}", project.title))
                } else {
                    Err(ApiError::ProjectNotFound(project.id))
                }
            }
            Commands::Styles { format } => {
                if format == "json" {
                    Ok(format_styles_json())
                } else {
                    Ok(format_styles_text())
                }
            }
        }
    }
}

/// Find a project by full id or unique id prefix.
pub fn resolve_project(studio: &Studio, reference: &str) -> Result<Arc<Project>, ApiError> {
    let reference = reference.trim();
    if let Ok(id) = reference.parse::<ProjectId>() {
        return studio
            .store()
            .project(&id)
            .ok_or(ApiError::ProjectNotFound(id));
    }
    if reference.is_empty() {
        return Err(ApiError::InvalidInput("project id cannot be empty".to_string()));
    }

    let snapshot = studio.projects();
    let mut matches = snapshot
        .iter()
        .filter(|project| project.id.to_string().starts_with(reference));
    match (matches.next(), matches.next()) {
        (Some(project), None) => Ok(Arc::clone(project)),
        (Some(_), Some(_)) => Err(ApiError::InvalidInput(format!(
            "project id prefix '{}' is ambiguous",
            reference
        ))),
        (None, _) => Err(ApiError::InvalidInput(format!(
            "no project matches '{}'",
            reference
        ))),
    }
}

/// Find a panel of the project's first page by 1-based number or id prefix.
pub fn resolve_panel(project: &Project, reference: &str) -> Result<PanelId, ApiError> {
    let reference = reference.trim();
    let panels = project.primary_panels();
    if let Ok(number) = reference.parse::<usize>() {
        return number
            .checked_sub(1)
            .and_then(|index| panels.get(index))
            .map(|panel| panel.id)
            .ok_or_else(|| {
                ApiError::InvalidInput(format!(
                    "panel number {} is out of range (1-{})",
                    number,
                    panels.len()
                ))
            });
    }
    if reference.is_empty() {
        return Err(ApiError::InvalidInput("panel id cannot be empty".to_string()));
    }

    let mut matches = panels
        .iter()
        .filter(|panel| panel.id.to_string().starts_with(reference));
    match (matches.next(), matches.next()) {
        (Some(panel), None) => Ok(panel.id),
        (Some(_), Some(_)) => Err(ApiError::InvalidInput(format!(
            "panel id prefix '{}' is ambiguous",
            reference
        ))),
        (None, _) => Err(ApiError::InvalidInput(format!(
            "no panel of '{}' matches '{}'",
            project.title, reference
        ))),
    }
}
