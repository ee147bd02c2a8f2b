//! Merge rules: defaults first, then global file, explicit file, environment.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Prefix for environment overrides, e.g. `MANGAFLOW__API__BASE_URL`
pub const ENV_PREFIX: &str = "MANGAFLOW";
/// Separator between prefix, section and key in environment overrides
pub const ENV_SEPARATOR: &str = "__";

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("api.base_url", crate::config::DEFAULT_BASE_URL)?
        .set_default("api.model", crate::config::DEFAULT_MODEL)?
        .set_default("api.poll_interval_secs", 5)?
        .set_default("api.poll_timeout_secs", 300)?
        .set_default("logging.format", "text")
}

/// Environment source; always the highest precedence layer.
pub fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
}
