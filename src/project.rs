//! Project Model
//!
//! Projects own an ordered list of pages, and pages own an ordered list of panels.
//! Values here are plain data; the store replaces them wholesale rather than
//! mutating them in place.

pub mod state;
pub mod update;

pub use state::{PanelEvent, PanelStatus};
pub use update::PanelPatch;

use crate::types::{ImageLocator, MangaStyle, PageId, PanelId, ProjectId};
use serde::{Deserialize, Serialize};

/// A user-authored comic series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    pub description: String,
    pub style: MangaStyle,
    /// Milliseconds since the Unix epoch
    pub created_at: i64,
    pub pages: Vec<Page>,
}

impl Project {
    /// Build a project with a single page holding `panels`.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        style: MangaStyle,
        panels: Vec<Panel>,
    ) -> Self {
        Self {
            id: ProjectId::new(),
            title: title.into(),
            description: description.into(),
            style,
            created_at: chrono::Utc::now().timestamp_millis(),
            pages: vec![Page::new(panels)],
        }
    }

    /// Panels of the first page, the only page this version lays out.
    pub fn primary_panels(&self) -> &[Panel] {
        self.pages
            .first()
            .map(|page| page.panels.as_slice())
            .unwrap_or_default()
    }

    pub fn find_panel(&self, panel_id: &PanelId) -> Option<&Panel> {
        self.pages
            .iter()
            .flat_map(|page| page.panels.iter())
            .find(|panel| panel.id == *panel_id)
    }

    pub fn panel_count(&self) -> usize {
        self.pages.iter().map(|page| page.panels.len()).sum()
    }

    /// Count panels per status, in `PanelStatus::ALL` order.
    pub fn status_counts(&self) -> [usize; 4] {
        let mut counts = [0usize; 4];
        for panel in self.pages.iter().flat_map(|page| page.panels.iter()) {
            let slot = PanelStatus::ALL
                .iter()
                .position(|status| *status == panel.status())
                .unwrap_or_default();
            counts[slot] += 1;
        }
        counts
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    pub panels: Vec<Panel>,
}

impl Page {
    pub fn new(panels: Vec<Panel>) -> Self {
        Self {
            id: PageId::new(),
            panels,
        }
    }
}

/// One illustrated unit of the narrative.
///
/// `status` and `image_url` are only reachable through [`Panel::apply_event`], which
/// keeps `image_url` set exactly when the panel is completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Panel {
    pub id: PanelId,
    pub prompt: String,
    pub caption: String,
    image_url: Option<ImageLocator>,
    status: PanelStatus,
}

impl Panel {
    /// A fresh, never-attempted panel
    pub fn new(prompt: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            id: PanelId::new(),
            prompt: prompt.into(),
            caption: caption.into(),
            image_url: None,
            status: PanelStatus::Idle,
        }
    }

    /// Same identity and text, lifecycle reset to idle
    pub fn into_idle(self) -> Self {
        Self {
            image_url: None,
            status: PanelStatus::Idle,
            ..self
        }
    }

    pub fn status(&self) -> PanelStatus {
        self.status
    }

    pub fn image_url(&self) -> Option<&ImageLocator> {
        self.image_url.as_ref()
    }
}
