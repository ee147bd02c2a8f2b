//! Storyline generation: turns a premise into the panel prompts and captions of a
//! new project.

use crate::error::ApiError;
use crate::project::Panel;
use crate::types::MangaStyle;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Title used when the premise has no words to borrow
pub const UNTITLED: &str = "Untitled Manga";

/// Prompt and caption for one planned panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryPanel {
    pub prompt: String,
    pub caption: String,
}

/// A planned storyline: a suggested title and panels in reading order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Storyline {
    pub title: String,
    pub panels: Vec<StoryPanel>,
}

impl Storyline {
    /// Fresh idle panels for this storyline, in order
    pub fn into_panels(self) -> Vec<Panel> {
        self.panels
            .into_iter()
            .map(|p| Panel::new(p.prompt, p.caption))
            .collect()
    }
}

#[async_trait]
pub trait StorylineGenerator: Send + Sync {
    async fn generate_storyline(
        &self,
        premise: &str,
        style: MangaStyle,
    ) -> Result<Storyline, ApiError>;
}

/// Deterministic four-beat storyline built from fixed templates
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateStoryline;

const BEATS: [(&str, &str); 4] = [
    (
        "Opening scene: {theme}. Establish the setting and mood in {style} style.",
        "The story begins...",
    ),
    (
        "Character introduction: {theme}. Show the main character in {style} style.",
        "Our hero appears",
    ),
    (
        "Action or conflict: {theme}. Dramatic moment in {style} style.",
        "The challenge arises",
    ),
    (
        "Climax or resolution: {theme}. Powerful conclusion in {style} style.",
        "The moment of truth",
    ),
];

impl TemplateStoryline {
    pub fn build(&self, premise: &str, style: MangaStyle) -> Storyline {
        let theme = premise.trim();
        let panels = BEATS
            .iter()
            .map(|(template, caption)| StoryPanel {
                prompt: template
                    .replace("{theme}", theme)
                    .replace("{style}", style.label()),
                caption: (*caption).to_string(),
            })
            .collect();
        Storyline {
            title: derive_title(theme),
            panels,
        }
    }
}

#[async_trait]
impl StorylineGenerator for TemplateStoryline {
    async fn generate_storyline(
        &self,
        premise: &str,
        style: MangaStyle,
    ) -> Result<Storyline, ApiError> {
        if premise.trim().is_empty() {
            return Err(ApiError::InvalidInput("premise cannot be empty".to_string()));
        }
        let storyline = self.build(premise, style);
        debug!(panels = storyline.panels.len(), "Storyline drafted from templates");
        Ok(storyline)
    }
}

/// First three words of the premise, or [`UNTITLED`]
pub fn derive_title(premise: &str) -> String {
    let words: Vec<&str> = premise.split_whitespace().take(3).collect();
    if words.is_empty() {
        UNTITLED.to_string()
    } else {
        words.join(" ")
    }
}
