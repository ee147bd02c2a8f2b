//! Core identifiers and value types shared across the orchestrator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

define_id!(
    /// Identity of a project
    ProjectId
);
define_id!(
    /// Identity of a page within a project
    PageId
);
define_id!(
    /// Identity of a panel, unique within its project
    PanelId
);

/// Locator of a generated image: a URL, an embedded `data:` URI, or a
/// service-relative path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageLocator(String);

impl ImageLocator {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Network-addressable or already-local locators need no retrieval.
    pub fn is_directly_addressable(&self) -> bool {
        const PREFIXES: [&str; 4] = ["http://", "https://", "data:", "blob:"];
        PREFIXES.iter().any(|prefix| {
            self.0
                .get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        })
    }
}

impl fmt::Display for ImageLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageLocator {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Closed set of visual styles a project can be drawn in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MangaStyle {
    #[serde(rename = "CLASSIC_SHONEN", alias = "Classic Shonen (Dynamic, detailed, ink lines)")]
    ClassicShonen,
    #[serde(
        rename = "SEINEN_NOIR",
        alias = "Seinen Noir (High contrast, gritty, realistic shades)"
    )]
    SeinenNoir,
    #[serde(
        rename = "KAWAII_SHOUJO",
        alias = "Kawaii Shoujo (Soft lines, floral patterns, dreamy)"
    )]
    KawaiiShoujo,
    #[serde(
        rename = "CYBERPUNK_MECHA",
        alias = "Cyberpunk Mecha (Neon accents, sharp metal, futuristic)"
    )]
    CyberpunkMecha,
    #[serde(rename = "GOTHIC_HORROR", alias = "Gothic Horror (Dark, eerie, victorian vibes)")]
    GothicHorror,
}

impl MangaStyle {
    pub const ALL: [MangaStyle; 5] = [
        MangaStyle::ClassicShonen,
        MangaStyle::SeinenNoir,
        MangaStyle::KawaiiShoujo,
        MangaStyle::CyberpunkMecha,
        MangaStyle::GothicHorror,
    ];

    /// Stable tag used in persisted data and on the command line
    pub fn tag(&self) -> &'static str {
        match self {
            MangaStyle::ClassicShonen => "CLASSIC_SHONEN",
            MangaStyle::SeinenNoir => "SEINEN_NOIR",
            MangaStyle::KawaiiShoujo => "KAWAII_SHOUJO",
            MangaStyle::CyberpunkMecha => "CYBERPUNK_MECHA",
            MangaStyle::GothicHorror => "GOTHIC_HORROR",
        }
    }

    /// Descriptive label fed into image prompts
    pub fn label(&self) -> &'static str {
        match self {
            MangaStyle::ClassicShonen => "Classic Shonen (Dynamic, detailed, ink lines)",
            MangaStyle::SeinenNoir => "Seinen Noir (High contrast, gritty, realistic shades)",
            MangaStyle::KawaiiShoujo => "Kawaii Shoujo (Soft lines, floral patterns, dreamy)",
            MangaStyle::CyberpunkMecha => "Cyberpunk Mecha (Neon accents, sharp metal, futuristic)",
            MangaStyle::GothicHorror => "Gothic Horror (Dark, eerie, victorian vibes)",
        }
    }

    /// Short name shown next to project titles
    pub fn short_name(&self) -> &'static str {
        self.label().split(' ').next().unwrap_or_default()
    }
}

impl Default for MangaStyle {
    fn default() -> Self {
        MangaStyle::ClassicShonen
    }
}

impl fmt::Display for MangaStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for MangaStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_").to_ascii_uppercase();
        MangaStyle::ALL
            .into_iter()
            .find(|style| style.tag() == normalized || style.label() == s.trim())
            .ok_or_else(|| {
                let known: Vec<&str> = MangaStyle::ALL.iter().map(|s| s.tag()).collect();
                format!("Unknown style '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}
