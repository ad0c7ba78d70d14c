//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field has a default so an empty file is valid.

pub mod database;
pub mod logging;
pub mod seed;
pub mod settings;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::seed::SeedConfig;
pub use self::settings::SettingsConfig;

use crate::error::AppError;

/// Prefix for environment variable overrides (`FLASHBOX__DATABASE__URL`).
pub const ENV_PREFIX: &str = "FLASHBOX";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Embedded database settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Key-value settings file (holds the seed flag).
    #[serde(default)]
    pub settings: SettingsConfig,
    /// Starter data settings.
    #[serde(default)]
    pub seed: SeedConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// The file is optional. An environment overlay named by `FLASHBOX_ENV`
    /// (`config/{env}.toml`) and environment variables prefixed with
    /// `FLASHBOX__` are merged on top.
    pub fn load(path: &str) -> Result<Self, AppError> {
        debug!(path, "Loading configuration");
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(path).required(false));

        if let Ok(env) = std::env::var("FLASHBOX_ENV") {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{env}")).required(false));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
