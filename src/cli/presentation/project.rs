//! Project command presentation: list, show and create results as text or json.

use crate::error::{ApiError, StorageError};
use crate::project::{PanelStatus, Project};
use crate::sequencer::SequenceReport;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::json;
use std::sync::Arc;

const SHORT_ID_LEN: usize = 8;
const PROMPT_WIDTH: usize = 48;
const LOCATOR_WIDTH: usize = 40;

fn short_id(id: impl ToString) -> String {
    id.to_string().chars().take(SHORT_ID_LEN).collect()
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

fn format_created(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn status_label(status: PanelStatus) -> String {
    match status {
        PanelStatus::Idle => format!("{}", status.as_str().dimmed()),
        PanelStatus::Generating => format!("{}", status.as_str().yellow()),
        PanelStatus::Completed => format!("{}", status.as_str().green()),
        PanelStatus::Error => format!("{}", status.as_str().red()),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value)
        .map_err(StorageError::from)
        .map_err(ApiError::from)
}

pub fn format_project_list_text(projects: &[Arc<Project>]) -> String {
    if projects.is_empty() {
        return "No projects yet.\n\nUse 'mangaflow create <premise>' to start one.".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["ID", "Title", "Style", "Panels", "Created"]);
    for project in projects {
        let [_, _, completed, _] = project.status_counts();
        table.add_row(vec![
            short_id(project.id),
            project.title.clone(),
            project.style.short_name().to_string(),
            format!("{}/{}", completed, project.panel_count()),
            format_created(project.created_at),
        ]);
    }
    format!("{}\n\nTotal: {} project(s)", table, projects.len())
}

pub fn format_project_list_json(projects: &[Arc<Project>]) -> Result<String, ApiError> {
    let rows: Vec<_> = projects
        .iter()
        .map(|project| {
            let [idle, generating, completed, error] = project.status_counts();
            json!({
                "id": project.id,
                "title": project.title,
                "style": project.style,
                "createdAt": project.created_at,
                "panels": {
                    "total": project.panel_count(),
                    "idle": idle,
                    "generating": generating,
                    "completed": completed,
                    "error": error,
                },
            })
        })
        .collect();
    to_json(&json!({ "projects": rows, "total": projects.len() }))
}

pub fn format_project_show_text(project: &Project) -> String {
    let mut out = format!("{}\n", project.title.bold().underline());
    out.push_str(&format!("ID:      {}\n", project.id));
    out.push_str(&format!("Style:   {}\n", project.style.label()));
    out.push_str(&format!("Created: {}\n", format_created(project.created_at)));
    out.push_str(&format!("Premise: {}\n\n", project.description));

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["#", "Panel", "Status", "Caption", "Prompt", "Image"]);
    for (index, panel) in project.primary_panels().iter().enumerate() {
        table.add_row(vec![
            (index + 1).to_string(),
            short_id(panel.id),
            status_label(panel.status()),
            panel.caption.clone(),
            truncate(&panel.prompt, PROMPT_WIDTH),
            panel
                .image_url()
                .map(|locator| truncate(locator.as_str(), LOCATOR_WIDTH))
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }
    out.push_str(&table.to_string());
    out
}

pub fn format_project_show_json(project: &Project) -> Result<String, ApiError> {
    to_json(project)
}

pub fn format_create_result_text(project: &Project, report: Option<&SequenceReport>) -> String {
    let mut out = format!(
        "Created project {} ({})\n",
        project.title.bold(),
        short_id(project.id)
    );
    match report {
        Some(report) => {
            out.push_str(&format!(
                "Panels: {} of {} completed, {} failed",
                report.completed.green(),
                report.total(),
                report.failed.red()
            ));
            if report.skipped > 0 {
                out.push_str(&format!(", {} skipped", report.skipped));
            }
        }
        None => out.push_str(&format!(
            "{} panels planned; run 'mangaflow regenerate' to draw them",
            project.panel_count()
        )),
    }
    out
}

pub fn format_create_result_json(
    project: &Project,
    report: Option<&SequenceReport>,
) -> Result<String, ApiError> {
    to_json(&json!({ "project": project, "report": report }))
}
