//! Entry point for loading configuration from every source.

use super::merge::merge_policy;
use super::sources::{explicit_file, global_file};
use super::MangaflowConfig;
use config::ConfigError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads `MangaflowConfig` from defaults, files and environment
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration: defaults, global file, `explicit` file when given, then
    /// environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<MangaflowConfig, ConfigError> {
        let mut builder = merge_policy::builder_with_defaults()?;
        builder = global_file::add_to_builder(builder)?;
        if let Some(path) = explicit {
            builder = explicit_file::add_to_builder(builder, path)?;
        }
        let config: MangaflowConfig = builder
            .add_source(merge_policy::environment())
            .build()?
            .try_deserialize()?;
        debug!(explicit = ?explicit, "Configuration loaded");
        Ok(config)
    }

    /// Load from a single file plus environment overrides, skipping the global file.
    pub fn load_from_file(path: &Path) -> Result<MangaflowConfig, ConfigError> {
        let builder = explicit_file::add_to_builder(merge_policy::builder_with_defaults()?, path)?;
        builder
            .add_source(merge_policy::environment())
            .build()?
            .try_deserialize()
    }

    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }
}
