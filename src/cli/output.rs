//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ApiError;

/// Process exit code for any failed command
pub const EXIT_FAILURE: i32 = 1;

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::ProjectNotFound(_) | ApiError::PanelNotFound { .. } => {
            format!("Error: {}\nRun 'mangaflow list' to see stored projects.", e)
        }
        ApiError::ConfigError(_) => format!(
            "Error: {}\nCheck your config file or MANGAFLOW__* environment variables.",
            e
        ),
        _ => format!("Error: {}", e),
    }
}
