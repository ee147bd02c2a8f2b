//! Remote Job Client
//!
//! Drives one image-generation job on the remote asynchronous task API: create the
//! task, poll it on a fixed interval until it reaches a terminal status or the time
//! budget runs out, then resolve the returned locator. Callers of
//! [`ImageGenerator::generate_panel_image`] only ever see an image or nothing.

pub mod modelscope;
pub mod resolve;

pub use modelscope::ModelScopeTransport;

use crate::error::GenerationError;
use crate::types::{ImageLocator, MangaStyle};
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Default wait between two status queries
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
/// Default wall-clock budget for polling one task
pub const DEFAULT_POLL_BUDGET: Duration = Duration::from_secs(5 * 60);

/// Opaque identifier the service assigns to a job
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status reported for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    /// Anything the service reports that this client does not know; treated as
    /// still in progress
    Unknown,
}

impl TaskStatus {
    pub fn from_wire(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "PENDING" => TaskStatus::Pending,
            "RUNNING" | "PROCESSING" => TaskStatus::Running,
            "SUCCEEDED" | "SUCCEED" | "SUCCESS" => TaskStatus::Succeeded,
            "FAILED" => TaskStatus::Failed,
            _ => TaskStatus::Unknown,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Succeeded | TaskStatus::Failed)
    }
}

/// Body of `GET /v1/tasks/{task_id}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskStatusResponse {
    pub task_status: String,
    #[serde(default)]
    pub output_images: Option<Vec<String>>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl TaskStatusResponse {
    pub fn status(&self) -> TaskStatus {
        TaskStatus::from_wire(&self.task_status)
    }

    /// First non-blank output locator
    pub fn first_image(&self) -> Option<ImageLocator> {
        self.output_images
            .iter()
            .flatten()
            .find(|locator| !locator.trim().is_empty())
            .map(|locator| ImageLocator::new(locator.as_str()))
    }

    pub fn failure_message(&self) -> String {
        self.error_message
            .as_deref()
            .or(self.message.as_deref())
            .filter(|m| !m.trim().is_empty())
            .unwrap_or("Image generation failed")
            .to_string()
    }
}

/// Bytes retrieved for a locator that was not directly addressable
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Wire access to the remote task API
#[async_trait]
pub trait TaskTransport: Send + Sync {
    /// Submit a generation task for a fully-expanded prompt
    async fn submit(&self, prompt: &str) -> Result<TaskId, GenerationError>;

    /// Query a task's current status
    async fn status(&self, task_id: &TaskId) -> Result<TaskStatusResponse, GenerationError>;

    /// Retrieve the bytes behind a service-relative locator
    async fn fetch_image(&self, locator: &ImageLocator) -> Result<FetchedImage, GenerationError>;
}

/// Produces one panel image, or nothing when the attempt failed for any reason
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate_panel_image(&self, prompt: &str, style: MangaStyle) -> Option<ImageLocator>;
}

/// Polling cadence and budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub budget: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            budget: DEFAULT_POLL_BUDGET,
        }
    }
}

/// Expand a panel prompt into the full instruction sent to the image model
pub fn build_panel_prompt(panel_prompt: &str, style: MangaStyle) -> String {
    format!(
        "Manga illustration in the style of {}. {}. High quality, professional line art, \
         detailed backgrounds, expressive characters. Clean black and white manga \
         aesthetics unless specified otherwise.",
        style.label(),
        panel_prompt.trim()
    )
}

pub struct JobClient {
    transport: Arc<dyn TaskTransport>,
    settings: PollSettings,
}

impl JobClient {
    pub fn new(transport: Arc<dyn TaskTransport>, settings: PollSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    /// Submit a task for one panel prompt drawn in `style`
    pub async fn create_task(
        &self,
        panel_prompt: &str,
        style: MangaStyle,
    ) -> Result<TaskId, GenerationError> {
        let prompt = build_panel_prompt(panel_prompt, style);
        let task_id = self.transport.submit(&prompt).await?;
        info!(task_id = %task_id, style = %style, "Image task created");
        Ok(task_id)
    }

    /// Poll `task_id` until it succeeds, fails, or the budget is spent.
    ///
    /// The budget starts at the first poll. Transient failures of individual polls are
    /// logged and retried on the next tick without touching the budget.
    pub async fn poll_task(&self, task_id: &TaskId) -> Result<ImageLocator, GenerationError> {
        let started = Instant::now();
        let mut polls = 0u32;

        loop {
            let remaining = self.settings.budget.saturating_sub(started.elapsed());
            if remaining.is_zero() {
                warn!(task_id = %task_id, polls, "Image task polling budget exhausted");
                return Err(GenerationError::Timeout(self.settings.budget));
            }

            polls += 1;
            let response = match tokio::time::timeout(remaining, self.transport.status(task_id))
                .await
            {
                Ok(response) => response,
                Err(_) => return Err(GenerationError::Timeout(self.settings.budget)),
            };

            match response {
                Ok(response) => match response.status() {
                    TaskStatus::Succeeded => {
                        let locator = response.first_image().ok_or(GenerationError::EmptyResult)?;
                        info!(task_id = %task_id, polls, "Image task succeeded");
                        return Ok(locator);
                    }
                    TaskStatus::Failed => {
                        return Err(GenerationError::GenerationFailed(response.failure_message()));
                    }
                    status => {
                        debug!(task_id = %task_id, ?status, polls, "Image task still in progress");
                    }
                },
                Err(e) if e.is_transient() => {
                    warn!(task_id = %task_id, error = %e, "Transient error while polling, retrying");
                }
                Err(e) => return Err(e),
            }

            let remaining = self.settings.budget.saturating_sub(started.elapsed());
            tokio::time::sleep(self.settings.interval.min(remaining)).await;
        }
    }

    /// Turn a returned locator into one the caller can display.
    ///
    /// Directly addressable locators pass through untouched. Anything else is fetched
    /// and embedded; if that fails the original locator is returned as-is.
    pub async fn resolve_locator(&self, locator: ImageLocator) -> ImageLocator {
        if locator.is_directly_addressable() {
            return locator;
        }
        match self.transport.fetch_image(&locator).await {
            Ok(image) if !image.bytes.is_empty() => resolve::embed_as_data_uri(&image),
            Ok(_) => {
                warn!(locator = %locator, "Fetched image was empty, keeping original locator");
                locator
            }
            Err(e) => {
                warn!(locator = %locator, error = %e, "Failed to fetch image, keeping original locator");
                locator
            }
        }
    }

    async fn try_generate(
        &self,
        panel_prompt: &str,
        style: MangaStyle,
    ) -> Result<ImageLocator, GenerationError> {
        let task_id = self.create_task(panel_prompt, style).await?;
        let locator = self.poll_task(&task_id).await?;
        Ok(self.resolve_locator(locator).await)
    }
}

#[async_trait]
impl ImageGenerator for JobClient {
    async fn generate_panel_image(&self, prompt: &str, style: MangaStyle) -> Option<ImageLocator> {
        match self.try_generate(prompt, style).await {
            Ok(locator) => Some(locator),
            Err(e) => {
                error!(error = %e, "Panel image generation failed");
                None
            }
        }
    }
}
