//! Shared test utilities for integration tests
//!
//! Environment isolation for config tests, plus fakes standing in for the remote image
//! service at both the transport and the generator seam.

use async_trait::async_trait;
use mangaflow::error::GenerationError;
use mangaflow::project::PanelStatus;
use mangaflow::remote::{
    FetchedImage, ImageGenerator, TaskId, TaskStatusResponse, TaskTransport,
};
use mangaflow::store::ProjectStore;
use mangaflow::types::{ImageLocator, MangaStyle};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Notify;

/// Global mutex to serialize environment variable access across all tests
static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Environment variable state to restore after test
struct EnvState {
    vars: Vec<(&'static str, Option<String>)>,
}

const ISOLATED_VARS: [&str; 4] = ["HOME", "XDG_CONFIG_HOME", "XDG_DATA_HOME", "MANGAFLOW__API__MODEL"];

impl EnvState {
    fn capture() -> Self {
        Self {
            vars: ISOLATED_VARS
                .iter()
                .map(|name| (*name, std::env::var(name).ok()))
                .collect(),
        }
    }

    fn restore(self) {
        for (name, value) in self.vars {
            match value {
                Some(orig) => std::env::set_var(name, orig),
                None => std::env::remove_var(name),
            }
        }
    }
}

/// Run `f` with HOME, XDG_CONFIG_HOME and XDG_DATA_HOME pointing into `test_dir`.
/// The original environment is restored afterwards.
pub fn with_xdg_env<F, R>(test_dir: &TempDir, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let env_state = EnvState::capture();

    let test_config_home = test_dir.path().join("config");
    let test_data_home = test_dir.path().join("data");
    let test_home = test_dir.path().join("home");
    for dir in [&test_config_home, &test_data_home, &test_home] {
        std::fs::create_dir_all(dir).unwrap();
    }

    std::env::set_var("HOME", &test_home);
    std::env::set_var("XDG_CONFIG_HOME", &test_config_home);
    std::env::set_var("XDG_DATA_HOME", &test_data_home);

    let result = f();

    env_state.restore();
    result
}

/// What a scripted task does once submitted
#[derive(Debug, Clone)]
pub enum TaskScript {
    /// Report RUNNING for `running` polls, then SUCCEED with `image`
    Succeed { running: usize, image: String },
    /// Report RUNNING for `running` polls, then FAILED with `message`
    Fail { running: usize, message: String },
    /// Never leave RUNNING
    Hang,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Submit { task: String, prompt: String },
    Status { task: String },
}

/// Transport that hands out `task-1`, `task-2`, ... and plays one script per task
#[derive(Default)]
pub struct ScriptedTransport {
    scripts: Mutex<VecDeque<TaskScript>>,
    tasks: Mutex<HashMap<String, (TaskScript, usize)>>,
    events: Mutex<Vec<TransportEvent>>,
}

impl ScriptedTransport {
    pub fn new(scripts: Vec<TaskScript>) -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(scripts.into()),
            ..Self::default()
        })
    }

    pub fn events(&self) -> Vec<TransportEvent> {
        self.events.lock().clone()
    }

    pub fn submitted_prompts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                TransportEvent::Submit { prompt, .. } => Some(prompt),
                TransportEvent::Status { .. } => None,
            })
            .collect()
    }
}

fn status_response(status: &str) -> TaskStatusResponse {
    TaskStatusResponse {
        task_status: status.to_string(),
        ..TaskStatusResponse::default()
    }
}

#[async_trait]
impl TaskTransport for ScriptedTransport {
    async fn submit(&self, prompt: &str) -> Result<TaskId, GenerationError> {
        let script = self
            .scripts
            .lock()
            .pop_front()
            .ok_or_else(|| GenerationError::Api {
                status: 500,
                body: "no scripted task left".to_string(),
            })?;
        let mut tasks = self.tasks.lock();
        let task = format!("task-{}", tasks.len() + 1);
        tasks.insert(task.clone(), (script, 0));
        self.events.lock().push(TransportEvent::Submit {
            task: task.clone(),
            prompt: prompt.to_string(),
        });
        Ok(TaskId::new(task))
    }

    async fn status(&self, task_id: &TaskId) -> Result<TaskStatusResponse, GenerationError> {
        self.events.lock().push(TransportEvent::Status {
            task: task_id.to_string(),
        });
        let mut tasks = self.tasks.lock();
        let (script, polls) = tasks
            .get_mut(task_id.as_str())
            .ok_or_else(|| GenerationError::Api {
                status: 404,
                body: "unknown task".to_string(),
            })?;
        *polls += 1;
        let response = match script {
            TaskScript::Succeed { running, image } if *polls > *running => TaskStatusResponse {
                output_images: Some(vec![image.clone()]),
                ..status_response("SUCCEED")
            },
            TaskScript::Fail { running, message } if *polls > *running => TaskStatusResponse {
                error_message: Some(message.clone()),
                ..status_response("FAILED")
            },
            _ => status_response("RUNNING"),
        };
        Ok(response)
    }

    async fn fetch_image(&self, locator: &ImageLocator) -> Result<FetchedImage, GenerationError> {
        Err(GenerationError::Network(format!("cannot fetch {}", locator)))
    }
}

/// Wraps a generator and records the first page's statuses at the start of every call
pub struct ObservingGenerator {
    inner: Arc<dyn ImageGenerator>,
    store: Arc<ProjectStore>,
    observed: Mutex<Vec<Vec<PanelStatus>>>,
}

impl ObservingGenerator {
    pub fn new(inner: Arc<dyn ImageGenerator>, store: Arc<ProjectStore>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            store,
            observed: Mutex::new(Vec::new()),
        })
    }

    pub fn observed(&self) -> Vec<Vec<PanelStatus>> {
        self.observed.lock().clone()
    }
}

#[async_trait]
impl ImageGenerator for ObservingGenerator {
    async fn generate_panel_image(&self, prompt: &str, style: MangaStyle) -> Option<ImageLocator> {
        if let Some(project) = self.store.snapshot().first() {
            self.observed
                .lock()
                .push(project.primary_panels().iter().map(|p| p.status()).collect());
        }
        self.inner.generate_panel_image(prompt, style).await
    }
}

/// Generator that blocks every call until released, then returns `image`
pub struct GatedGenerator {
    gate: Notify,
    image: Option<String>,
    calls: Mutex<usize>,
}

impl GatedGenerator {
    pub fn new(image: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            gate: Notify::new(),
            image: image.map(str::to_string),
            calls: Mutex::new(0),
        })
    }

    /// Let one pending (or the next) call finish
    pub fn release_one(&self) {
        self.gate.notify_one();
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl ImageGenerator for GatedGenerator {
    async fn generate_panel_image(&self, _: &str, _: MangaStyle) -> Option<ImageLocator> {
        *self.calls.lock() += 1;
        self.gate.notified().await;
        self.image.as_deref().map(ImageLocator::new)
    }
}

/// Generator that sleeps, then returns a distinct image per call
pub struct DelayedGenerator {
    delay: Duration,
    calls: Mutex<usize>,
}

impl DelayedGenerator {
    pub fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            calls: Mutex::new(0),
        })
    }
}

#[async_trait]
impl ImageGenerator for DelayedGenerator {
    async fn generate_panel_image(&self, _: &str, _: MangaStyle) -> Option<ImageLocator> {
        let call = {
            let mut calls = self.calls.lock();
            *calls += 1;
            *calls
        };
        tokio::time::sleep(self.delay).await;
        Some(ImageLocator::new(format!("https://cdn.example/attempt-{}.png", call)))
    }
}

/// Poll `condition` on the runtime until it holds, yielding in between
pub async fn wait_until<F: Fn() -> bool>(condition: F) {
    for _ in 0..10_000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition never became true");
}
