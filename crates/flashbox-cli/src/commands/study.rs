//! Study pool CLI commands.

use clap::{Args, Subcommand};

use flashbox_core::config::AppConfig;
use flashbox_core::error::AppError;
use flashbox_core::types::CardId;

use crate::output::{self, CardRow, OutputFormat};

/// Arguments for study commands
#[derive(Debug, Args)]
pub struct StudyArgs {
    /// Study subcommand
    #[command(subcommand)]
    pub command: StudyCommand,
}

/// Study subcommands
#[derive(Debug, Subcommand)]
pub enum StudyCommand {
    /// List every card in the study pool
    Pool,
    /// Draw a random card from the pool
    Draw {
        /// Avoid drawing this card again if possible
        #[arg(long)]
        after: Option<String>,
        /// Print the back side too
        #[arg(long)]
        reveal: bool,
    },
}

/// Execute study commands
pub async fn execute(
    args: &StudyArgs,
    config: AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let ctx = super::open_context(config).await?;

    match &args.command {
        StudyCommand::Pool => {
            let cards = ctx.study.pool().await?;
            let rows: Vec<CardRow> = cards.iter().map(CardRow::from).collect();
            output::print_list(&rows, format);
        }
        StudyCommand::Draw { after, reveal } => {
            let previous = after.as_ref().map(CardId::new);
            let Some(card) = ctx.study.draw_after(previous.as_ref()).await? else {
                output::print_warning("The study pool is empty; select a collection first");
                return Ok(());
            };

            match format {
                OutputFormat::Json => output::print_json(&card),
                OutputFormat::Table => {
                    output::print_kv("Card", card.id.as_str());
                    output::print_kv("Front", &card.front_text);
                    if *reveal {
                        output::print_kv("Back", &card.back_text);
                    }
                }
            }
        }
    }

    Ok(())
}
