//! HTTP transport for the ModelScope asynchronous image API.

use super::{FetchedImage, TaskId, TaskStatusResponse, TaskTransport};
use crate::config::ApiConfig;
use crate::error::{ApiError, GenerationError};
use crate::types::ImageLocator;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const ASYNC_MODE_HEADER: &str = "X-ModelScope-Async-Mode";
const TASK_TYPE_HEADER: &str = "X-ModelScope-Task-Type";
const TASK_TYPE_IMAGE: &str = "image_generation";

#[derive(Debug, Deserialize)]
struct CreateTaskResponse {
    #[serde(default)]
    task_id: Option<String>,
}

fn build_http_client(config: &ApiConfig) -> Result<Client, ApiError> {
    Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
        .map_err(|e| ApiError::ConfigError(format!("Failed to create HTTP client: {}", e)))
}

/// ModelScope task API client
pub struct ModelScopeTransport {
    client: Client,
    base_url: String,
    /// `base_url` with a trailing slash, for joining relative locators
    base: Url,
    model: String,
    api_key: Option<String>,
}

impl ModelScopeTransport {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let api_key = config.resolved_api_key();
        if api_key.is_none() {
            warn!("No API key configured; image requests will be rejected by the service");
        }
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let base = Url::parse(&format!("{}/", base_url)).map_err(|e| {
            ApiError::ConfigError(format!("Invalid API base URL '{}': {}", config.base_url, e))
        })?;
        Ok(Self {
            client: build_http_client(config)?,
            base_url,
            base,
            model: config.model.clone(),
            api_key,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    /// Absolute URL for a locator the service returned relative to its base
    fn locator_url(&self, locator: &ImageLocator) -> Result<Url, GenerationError> {
        self.base.join(locator.as_str()).map_err(|e| {
            GenerationError::MalformedResponse(format!("Invalid image locator {}: {}", locator, e))
        })
    }

    /// The API key is only ever sent to the service's own origin.
    fn shares_origin(&self, url: &Url) -> bool {
        url.origin() == self.base.origin()
    }
}

#[async_trait]
impl TaskTransport for ModelScopeTransport {
    async fn submit(&self, prompt: &str) -> Result<TaskId, GenerationError> {
        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
        });
        let request = self
            .client
            .post(self.endpoint("v1/images/generations"))
            .header(ASYNC_MODE_HEADER, "true")
            .json(&body);
        let response = self.authorized(request).send().await.map_err(map_http_error)?;
        let created: CreateTaskResponse = read_json(response).await?;
        parse_task_id(created)
    }

    async fn status(&self, task_id: &TaskId) -> Result<TaskStatusResponse, GenerationError> {
        let request = self
            .client
            .get(self.endpoint(&format!("v1/tasks/{}", task_id)))
            .header(TASK_TYPE_HEADER, TASK_TYPE_IMAGE);
        let response = self.authorized(request).send().await.map_err(map_http_error)?;
        let status: TaskStatusResponse = read_json(response).await?;
        debug!(task_id = %task_id, task_status = %status.task_status, "Task status received");
        Ok(status)
    }

    async fn fetch_image(&self, locator: &ImageLocator) -> Result<FetchedImage, GenerationError> {
        let url = self.locator_url(locator)?;
        let request = if self.shares_origin(&url) {
            self.authorized(self.client.get(url))
        } else {
            debug!(url = %url, "Fetching image from a foreign origin without credentials");
            self.client.get(url)
        };
        let response = request.send().await.map_err(map_http_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), body));
        }
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await.map_err(map_http_error)?;
        Ok(FetchedImage {
            content_type,
            bytes: bytes.to_vec(),
        })
    }
}

fn parse_task_id(created: CreateTaskResponse) -> Result<TaskId, GenerationError> {
    created
        .task_id
        .filter(|id| !id.trim().is_empty())
        .map(TaskId::new)
        .ok_or_else(|| GenerationError::MalformedResponse("response has no task_id".to_string()))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, GenerationError> {
    let status = response.status();
    let body = response.text().await.map_err(map_http_error)?;
    if !status.is_success() {
        return Err(classify_status(status.as_u16(), body));
    }
    serde_json::from_str(&body).map_err(|e| GenerationError::MalformedResponse(e.to_string()))
}

fn classify_status(status: u16, body: String) -> GenerationError {
    match status {
        401 | 403 => GenerationError::Auth(body),
        _ => GenerationError::Api { status, body },
    }
}

fn map_http_error(err: reqwest::Error) -> GenerationError {
    if err.is_decode() {
        GenerationError::MalformedResponse(err.to_string())
    } else {
        GenerationError::Network(err.to_string())
    }
}
