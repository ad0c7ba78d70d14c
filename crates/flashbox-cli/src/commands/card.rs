//! Card management CLI commands.

use clap::{Args, Subcommand};

use flashbox_core::config::AppConfig;
use flashbox_core::error::AppError;
use flashbox_core::types::{CardId, CollectionId};

use crate::input::CardInput;
use crate::output::{self, CardRow, OutputFormat};

/// Arguments for card commands
#[derive(Debug, Args)]
pub struct CardArgs {
    /// Card subcommand
    #[command(subcommand)]
    pub command: CardCommand,
}

/// Card subcommands
#[derive(Debug, Subcommand)]
pub enum CardCommand {
    /// List the cards of a collection
    List {
        /// Collection ID
        collection: String,
    },
    /// Add a card to a collection
    Add {
        /// Collection ID
        collection: String,
        /// Front side
        #[arg(long)]
        front: String,
        /// Back side
        #[arg(long)]
        back: String,
    },
    /// Replace the text of a card
    Edit {
        /// Card ID
        id: String,
        /// Front side
        #[arg(long)]
        front: String,
        /// Back side
        #[arg(long)]
        back: String,
    },
    /// Delete a card
    Delete {
        /// Card ID
        id: String,
    },
}

/// Execute card commands
pub async fn execute(
    args: &CardArgs,
    config: AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let ctx = super::open_context(config).await?;
    let library = &ctx.library;

    match &args.command {
        CardCommand::List { collection } => {
            let cards = library
                .get_cards_by_collection(&CollectionId::new(collection))
                .await;
            let rows: Vec<CardRow> = cards.iter().map(CardRow::from).collect();
            output::print_list(&rows, format);
        }
        CardCommand::Add {
            collection,
            front,
            back,
        } => {
            let text = CardInput::parse(front, back)?;
            let id = library
                .create_card(
                    &text.front,
                    &text.back,
                    &CollectionId::new(collection),
                    ctx.owner(),
                )
                .await
                .ok_or_else(|| AppError::internal("Card creation failed; see the log"))?;
            output::print_success("Card added");
            output::print_kv("ID", id.as_str());
        }
        CardCommand::Edit { id, front, back } => {
            let text = CardInput::parse(front, back)?;
            super::ensure_applied(
                library
                    .update_card(&CardId::new(id), &text.front, &text.back)
                    .await,
                "Edit",
            )?;
            output::print_success("Card updated");
        }
        CardCommand::Delete { id } => {
            if library.delete_card(&CardId::new(id)).await {
                output::print_success("Card deleted");
            } else {
                output::print_warning(&format!("Card {id} not found"));
            }
        }
    }

    Ok(())
}
