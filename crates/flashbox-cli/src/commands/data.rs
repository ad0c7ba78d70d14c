//! Starter data and reset commands.

use clap::{Args, Subcommand};

use flashbox_core::config::AppConfig;
use flashbox_core::error::AppError;
use flashbox_database::SeedOutcome;
use flashbox_database::seed::DATA_LOADED_KEY;
use flashbox_service::AppContext;

use crate::output::{self, OutputFormat};

/// Arguments for data commands
#[derive(Debug, Args)]
pub struct DataArgs {
    /// Data subcommand
    #[command(subcommand)]
    pub command: DataCommand,
}

/// Data subcommands
#[derive(Debug, Subcommand)]
pub enum DataCommand {
    /// Load the starter data if it has not been loaded yet
    Seed,
    /// Show whether the starter data is loaded
    Status,
    /// Delete everything and load the starter data again
    Reset {
        /// Drop and re-create the tables instead of deleting rows
        #[arg(long)]
        drop_schema: bool,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

/// Execute data commands
pub async fn execute(
    args: &DataArgs,
    config: AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let ctx = AppContext::build(config).await?;

    match &args.command {
        DataCommand::Seed => {
            let outcome = ctx.seed.load().await?;
            print_outcome(&outcome, format);
        }
        DataCommand::Status => {
            let loaded = ctx.seed.is_loaded().await?;
            let folders = ctx.library.get_folders().await.len();
            let collections = ctx.library.get_collections().await.len();
            match format {
                OutputFormat::Json => output::print_json(&serde_json::json!({
                    (DATA_LOADED_KEY): loaded,
                    "folders": folders,
                    "collections": collections,
                })),
                OutputFormat::Table => {
                    output::print_kv("Starter data loaded", &loaded.to_string());
                    output::print_kv("Folders", &folders.to_string());
                    output::print_kv("Collections", &collections.to_string());
                }
            }
        }
        DataCommand::Reset { drop_schema, force } => {
            let prompt = if *drop_schema {
                "This will DROP all tables and reload the starter data. Continue?"
            } else {
                "This will delete all folders, collections, and cards and reload the starter data. Continue?"
            };
            if !super::confirm(prompt, *force)? {
                println!("Cancelled.");
                return Ok(());
            }

            let outcome = ctx.seed.reset(*drop_schema).await?;
            print_outcome(&outcome, format);
        }
    }

    Ok(())
}

fn print_outcome(outcome: &SeedOutcome, format: OutputFormat) {
    match (format, outcome) {
        (OutputFormat::Json, _) => output::print_json(outcome),
        (OutputFormat::Table, SeedOutcome::Skipped) => {
            output::print_warning("Starter data already loaded; nothing to do")
        }
        (
            OutputFormat::Table,
            SeedOutcome::Loaded {
                folders,
                collections,
                cards,
            },
        ) => output::print_success(&format!(
            "Loaded {folders} folders, {collections} collections, {cards} cards"
        )),
    }
}
