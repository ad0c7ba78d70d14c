//! Starter data configuration.

use serde::{Deserialize, Serialize};

/// Controls the first-run seed loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Whether startup loads the starter folders and collections.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Directory holding `folders.json` and `collections/*.json`.
    /// When unset the seed data compiled into the binary is used.
    #[serde(default)]
    pub directory: Option<String>,
    /// `createdByUser` tag for records created through the CLI.
    #[serde(default = "default_owner")]
    pub owner: i64,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            directory: None,
            owner: default_owner(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_owner() -> i64 {
    1
}
