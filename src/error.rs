//! Error types for the mangaflow panel generation orchestrator.

use crate::types::{PanelId, ProjectId};
use std::time::Duration;
use thiserror::Error;

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Snapshot database error: {0}")]
    Database(String),

    #[error("Snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<sled::Error> for StorageError {
    fn from(err: sled::Error) -> Self {
        StorageError::Database(err.to_string())
    }
}

/// Failure kinds of one remote generation attempt.
///
/// None of these cross the `generate_panel_image` boundary; they are logged and
/// collapsed into a missing image.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Image service returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Malformed response from image service: {0}")]
    MalformedResponse(String),

    #[error("Task succeeded but returned no image")]
    EmptyResult,

    #[error("Image generation failed: {0}")]
    GenerationFailed(String),

    #[error("Image generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Network error: {0}")]
    Network(String),
}

impl GenerationError {
    /// Whether a poll that failed this way should simply be retried on the next tick.
    pub fn is_transient(&self) -> bool {
        match self {
            GenerationError::Network(_) => true,
            GenerationError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Rejected panel state transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Panel is not generating (status: {0})")]
    NotGenerating(String),
}

/// Orchestrator-level errors surfaced to the studio and CLI
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Project not found: {0}")]
    ProjectNotFound(ProjectId),

    #[error("Panel not found: {panel} in project {project}")]
    PanelNotFound { project: ProjectId, panel: PanelId },

    #[error("No project selected")]
    NoProjectSelected,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storyline generation failed: {0}")]
    Storyline(String),

    #[error("Invalid panel transition: {0}")]
    InvalidTransition(#[from] TransitionError),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
