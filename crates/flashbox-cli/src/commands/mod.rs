//! CLI command definitions and dispatch.

pub mod card;
pub mod collection;
pub mod data;
pub mod folder;
pub mod migrate;
pub mod study;

use clap::{Parser, Subcommand};

use flashbox_core::config::AppConfig;
use flashbox_core::error::AppError;
use flashbox_core::types::FolderId;
use flashbox_entity::folder::FolderScope;
use flashbox_service::AppContext;

use crate::output::OutputFormat;

/// Flashbox: folders, collections, and flashcards in a local store
#[derive(Debug, Parser)]
#[command(name = "flashbox", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Folder management
    Folder(folder::FolderArgs),
    /// Collection management
    Collection(collection::CollectionArgs),
    /// Card management
    Card(card::CardArgs),
    /// Study pool
    Study(study::StudyArgs),
    /// Starter data and resets
    Data(data::DataArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Folder(args) => folder::execute(args, config, self.format).await,
            Commands::Collection(args) => collection::execute(args, config, self.format).await,
            Commands::Card(args) => card::execute(args, config, self.format).await,
            Commands::Study(args) => study::execute(args, config, self.format).await,
            Commands::Data(args) => data::execute(args, config, self.format).await,
            Commands::Migrate(args) => migrate::execute(args, config, self.format).await,
        }
    }
}

/// Helper: open the store and load starter data if this is the first run
pub async fn open_context(config: AppConfig) -> Result<AppContext, AppError> {
    AppContext::bootstrap(config).await
}

/// Helper: `None` selects the root.
pub fn scope(folder_id: Option<&String>) -> FolderScope {
    FolderScope::from(folder_id.map(FolderId::new))
}

/// Helper: turn a rejected facade write into an error
pub fn ensure_applied(applied: bool, what: &str) -> Result<(), AppError> {
    if applied {
        Ok(())
    } else {
        Err(AppError::internal(format!(
            "{what} failed; see the log for details"
        )))
    }
}

/// Helper: ask before destructive operations unless `--force` was given
pub fn confirm(prompt: &str, force: bool) -> Result<bool, AppError> {
    if force {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {e}")))
}
