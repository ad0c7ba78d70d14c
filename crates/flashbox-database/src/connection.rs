//! SQLite store handle and its open lifecycle.
//!
//! A [`Store`] starts `Unopened`. [`Store::open`] connects, runs the
//! migrations, and moves it to `Ready` (or `Failed`). Repositories hold a
//! clone of the handle and ask it for the pool on every call, so nothing can
//! touch the database before the schema exists.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tokio::sync::watch;
use tracing::{error, info, warn};

use flashbox_core::config::DatabaseConfig;
use flashbox_core::error::{AppError, ErrorKind};

use crate::migration;

/// Lifecycle state of the store, including the pool once ready.
#[derive(Debug, Clone)]
enum StoreState {
    Unopened,
    Opening,
    Ready(SqlitePool),
    Failed(String),
}

/// Observable phase of the store lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorePhase {
    /// `open()` has not been called (or the store was closed).
    Unopened,
    /// Connection and migrations are in progress.
    Opening,
    /// Repositories may be used.
    Ready,
    /// The last open attempt failed with the given message.
    Failed(String),
}

/// Process-wide handle to the embedded store.
///
/// Cloning is cheap and every clone observes the same lifecycle.
#[derive(Debug, Clone)]
pub struct Store {
    /// Connection settings.
    config: DatabaseConfig,
    /// Shared lifecycle state.
    state: Arc<watch::Sender<StoreState>>,
}

impl Store {
    /// Create an unopened store handle.
    pub fn new(config: DatabaseConfig) -> Self {
        let (state, _) = watch::channel(StoreState::Unopened);
        Self {
            config,
            state: Arc::new(state),
        }
    }

    /// Create a store handle and open it.
    pub async fn connect(config: DatabaseConfig) -> Result<Self, AppError> {
        let store = Self::new(config);
        store.open().await?;
        Ok(store)
    }

    /// Open a private in-memory store (tests and dry runs).
    pub async fn in_memory() -> Result<Self, AppError> {
        Self::connect(DatabaseConfig::in_memory()).await
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> StorePhase {
        match &*self.state.borrow() {
            StoreState::Unopened => StorePhase::Unopened,
            StoreState::Opening => StorePhase::Opening,
            StoreState::Ready(_) => StorePhase::Ready,
            StoreState::Failed(message) => StorePhase::Failed(message.clone()),
        }
    }

    /// Connect and migrate.
    ///
    /// Opening a ready store is a no-op; opening a failed store retries.
    /// A concurrent open while another is in flight is rejected.
    pub async fn open(&self) -> Result<(), AppError> {
        let mut claimed = false;
        self.state.send_if_modified(|state| match state {
            StoreState::Unopened | StoreState::Failed(_) => {
                *state = StoreState::Opening;
                claimed = true;
                true
            }
            _ => false,
        });

        if !claimed {
            return match self.phase() {
                StorePhase::Ready => Ok(()),
                _ => Err(AppError::conflict("Store is already being opened")),
            };
        }

        let guard = OpenGuard {
            state: &self.state,
            armed: true,
        };
        let result = self.connect_and_migrate().await;
        guard.disarm();

        match result {
            Ok(pool) => {
                self.state.send_replace(StoreState::Ready(pool));
                info!(url = %self.config.url, "Store ready");
                Ok(())
            }
            Err(e) => {
                error!(url = %self.config.url, error = %e, "Store failed to open");
                self.state.send_replace(StoreState::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Wait until an in-flight open finishes.
    ///
    /// Returns immediately for a ready or failed store. Waits indefinitely
    /// on a store nobody opens.
    pub async fn wait_ready(&self) -> Result<(), AppError> {
        let mut rx = self.state.subscribe();
        let state = rx
            .wait_for(|s| matches!(s, StoreState::Ready(_) | StoreState::Failed(_)))
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Store handle dropped", e))?;

        let failure = match &*state {
            StoreState::Failed(message) => Some(message.clone()),
            _ => None,
        };
        drop(state);

        match failure {
            Some(message) => Err(AppError::service_unavailable(format!(
                "Store failed to open: {message}"
            ))),
            None => Ok(()),
        }
    }

    /// The connection pool, available only once the store is ready.
    pub fn pool(&self) -> Result<SqlitePool, AppError> {
        match &*self.state.borrow() {
            StoreState::Ready(pool) => Ok(pool.clone()),
            StoreState::Unopened => Err(AppError::service_unavailable("Store is not open")),
            StoreState::Opening => Err(AppError::service_unavailable("Store is still opening")),
            StoreState::Failed(message) => Err(AppError::service_unavailable(format!(
                "Store failed to open: {message}"
            ))),
        }
    }

    /// Drop all tables and re-create the schema.
    pub async fn reset_schema(&self) -> Result<(), AppError> {
        let pool = self.pool()?;
        warn!(url = %self.config.url, "Resetting database schema");
        migration::drop_schema(&pool).await?;
        migration::run_migrations(&pool).await
    }

    /// Close all connections and return to `Unopened`.
    pub async fn close(&self) {
        if let StoreState::Ready(pool) = self.state.send_replace(StoreState::Unopened) {
            pool.close().await;
            info!("Store closed");
        }
    }

    async fn connect_and_migrate(&self) -> Result<SqlitePool, AppError> {
        info!(
            url = %self.config.url,
            max_connections = self.config.max_connections,
            "Opening SQLite store"
        );

        let options = SqliteConnectOptions::from_str(&self.config.url)
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Invalid database URL '{}'", self.config.url),
                    e,
                )
            })?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(self.config.busy_timeout_seconds));

        let mut pool_options =
            SqlitePoolOptions::new().max_connections(self.config.max_connections.max(1));

        if self.config.is_in_memory() {
            // Every in-memory connection is its own database; keep exactly one alive.
            pool_options = pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        } else if let Some(parent) = options.get_filename().parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let pool = pool_options.connect_with(options).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to connect to database: {e}"),
                e,
            )
        })?;

        migration::run_migrations(&pool).await?;
        Ok(pool)
    }
}

/// Marks an in-flight open as failed if its future is dropped before finishing.
struct OpenGuard<'a> {
    state: &'a watch::Sender<StoreState>,
    armed: bool,
}

impl OpenGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for OpenGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let reset = self.state.send_if_modified(|state| {
            if matches!(state, StoreState::Opening) {
                *state = StoreState::Failed("open cancelled".to_string());
                true
            } else {
                false
            }
        });
        if reset {
            warn!("Store open was cancelled before completing");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unopened_store_rejects_pool_access() {
        let store = Store::new(DatabaseConfig::in_memory());
        assert_eq!(store.phase(), StorePhase::Unopened);
        let err = store.pool().unwrap_err();
        assert_eq!(err.kind, ErrorKind::ServiceUnavailable);
    }

    #[tokio::test]
    async fn test_open_moves_to_ready_and_is_idempotent() {
        let store = Store::new(DatabaseConfig::in_memory());
        store.open().await.unwrap();
        assert_eq!(store.phase(), StorePhase::Ready);
        store.open().await.unwrap();
        store.wait_ready().await.unwrap();
        assert!(store.pool().is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_path_moves_to_failed() {
        // A regular file cannot act as the database's parent directory.
        let blocker = tempfile::NamedTempFile::new().unwrap();
        let store = Store::new(DatabaseConfig {
            url: format!("sqlite://{}/cards.db", blocker.path().display()),
            ..DatabaseConfig::default()
        });
        assert!(store.open().await.is_err());
        assert!(matches!(store.phase(), StorePhase::Failed(_)));
        assert!(store.wait_ready().await.is_err());
        assert_eq!(store.pool().unwrap_err().kind, ErrorKind::ServiceUnavailable);
    }

    #[tokio::test]
    async fn test_dropped_open_marks_store_failed() {
        let store = Store::new(DatabaseConfig::in_memory());
        store.state.send_replace(StoreState::Opening);
        drop(OpenGuard {
            state: &store.state,
            armed: true,
        });
        assert_eq!(store.phase(), StorePhase::Failed("open cancelled".into()));
        assert!(store.wait_ready().await.is_err());
    }

    #[tokio::test]
    async fn test_cancelled_open_can_be_retried() {
        let store = Store::new(DatabaseConfig::in_memory());
        let _ = tokio::time::timeout(Duration::ZERO, store.open()).await;
        assert_ne!(store.phase(), StorePhase::Opening);

        store.open().await.unwrap();
        store.wait_ready().await.unwrap();
        assert_eq!(store.phase(), StorePhase::Ready);
    }

    #[tokio::test]
    async fn test_close_returns_to_unopened() {
        let store = Store::in_memory().await.unwrap();
        store.close().await;
        assert_eq!(store.phase(), StorePhase::Unopened);
        assert!(store.pool().is_err());
    }

    #[tokio::test]
    async fn test_file_store_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cards.db");
        let store = Store::connect(DatabaseConfig {
            url: format!("sqlite://{}", path.display()),
            ..DatabaseConfig::default()
        })
        .await
        .unwrap();
        assert!(path.exists());
        store.close().await;
    }

    #[tokio::test]
    async fn test_reset_schema_leaves_empty_tables() {
        let store = Store::in_memory().await.unwrap();
        let pool = store.pool().unwrap();
        sqlx::query("INSERT INTO folders (id, name) VALUES ('f1', 'Temp')")
            .execute(&pool)
            .await
            .unwrap();

        store.reset_schema().await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM folders")
            .fetch_one(&store.pool().unwrap())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
