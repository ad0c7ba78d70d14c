//! Shared test helpers for integration tests.

#![allow(dead_code)]

use tempfile::TempDir;

use flashbox_core::config::{AppConfig, DatabaseConfig, SeedConfig, SettingsConfig};
use flashbox_service::AppContext;

/// Test application backed by a throwaway directory.
pub struct TestApp {
    /// Wired services.
    pub ctx: AppContext,
    /// Keeps the database and settings files alive for the test.
    pub dir: TempDir,
}

impl TestApp {
    /// Create an empty application (no starter data).
    pub async fn new() -> Self {
        Self::with_seed(false).await
    }

    /// Create an application and load the built-in starter data.
    pub async fn seeded() -> Self {
        Self::with_seed(true).await
    }

    async fn with_seed(enabled: bool) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = Self::config_for(&dir, enabled);
        let ctx = AppContext::bootstrap(config)
            .await
            .expect("Failed to bootstrap application");
        Self { ctx, dir }
    }

    /// Configuration pointing the database and settings file into `dir`.
    pub fn config_for(dir: &TempDir, seed: bool) -> AppConfig {
        AppConfig {
            database: DatabaseConfig {
                url: format!("sqlite://{}", dir.path().join("flashcards.db").display()),
                ..DatabaseConfig::default()
            },
            settings: SettingsConfig {
                path: dir.path().join("settings.json").display().to_string(),
            },
            seed: SeedConfig {
                enabled: seed,
                ..SeedConfig::default()
            },
            ..AppConfig::default()
        }
    }

    /// Row count of a table, bypassing the facade.
    pub async fn count(&self, table: &str) -> i64 {
        let pool = self.ctx.store.pool().expect("Store not ready");
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .expect("Failed to count rows")
    }
}
