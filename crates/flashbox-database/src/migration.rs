//! Database migration runner.

use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use tracing::info;

use flashbox_core::error::{AppError, ErrorKind};

/// Tables dropped by [`drop_schema`], children first.
const TABLES: [&str; 4] = ["cards", "collections", "folders", "_sqlx_migrations"];

/// A row of the migration ledger.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AppliedMigration {
    /// Migration version (file prefix).
    pub version: i64,
    /// Description taken from the file name.
    pub description: String,
    /// Whether the migration completed.
    pub success: bool,
}

/// Run all pending database migrations.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), AppError> {
    info!("Running database migrations...");

    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to run migrations: {e}"),
                e,
            )
        })?;

    info!("Database migrations completed successfully");
    Ok(())
}

/// Drop every application table together with the migration ledger.
pub async fn drop_schema(pool: &SqlitePool) -> Result<(), AppError> {
    for table in TABLES {
        sqlx::query(&format!("DROP TABLE IF EXISTS {table}"))
            .execute(pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to drop table {table}"),
                    e,
                )
            })?;
    }
    info!("Database schema dropped");
    Ok(())
}

/// List the migrations recorded in the ledger, oldest first.
pub async fn migration_status(pool: &SqlitePool) -> Result<Vec<AppliedMigration>, AppError> {
    sqlx::query_as::<_, AppliedMigration>(
        "SELECT version, description, success FROM _sqlx_migrations ORDER BY version",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read migration ledger", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Store;

    #[tokio::test]
    async fn test_status_lists_initial_schema() {
        let store = Store::in_memory().await.unwrap();
        let applied = migration_status(&store.pool().unwrap()).await.unwrap();
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].version, 1);
        assert!(applied[0].success);
    }

    #[tokio::test]
    async fn test_rerun_is_a_no_op() {
        let store = Store::in_memory().await.unwrap();
        let pool = store.pool().unwrap();
        run_migrations(&pool).await.unwrap();
        assert_eq!(migration_status(&pool).await.unwrap().len(), 1);
    }
}
