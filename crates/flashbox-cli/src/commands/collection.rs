//! Collection management CLI commands.

use clap::{Args, Subcommand};

use flashbox_core::config::AppConfig;
use flashbox_core::error::AppError;
use flashbox_core::types::CollectionId;

use crate::input::NameInput;
use crate::output::{self, CollectionRow, OutputFormat};

/// Arguments for collection commands
#[derive(Debug, Args)]
pub struct CollectionArgs {
    /// Collection subcommand
    #[command(subcommand)]
    pub command: CollectionCommand,
}

/// Collection subcommands
#[derive(Debug, Subcommand)]
pub enum CollectionCommand {
    /// List collections (all of them unless filtered)
    List {
        /// Only collections filed directly in this folder
        #[arg(long, conflicts_with_all = ["root", "selected"])]
        folder: Option<String>,
        /// Only unfiled collections
        #[arg(long, conflicts_with = "selected")]
        root: bool,
        /// Only collections in the study pool
        #[arg(long)]
        selected: bool,
    },
    /// Create a new collection
    Create {
        /// Collection name
        #[arg(short, long)]
        name: String,
        /// Folder ID (omit for an unfiled collection)
        #[arg(long)]
        folder: Option<String>,
        /// Add it to the study pool right away
        #[arg(long)]
        selected: bool,
    },
    /// Rename a collection
    Rename {
        /// Collection ID
        id: String,
        /// New name
        #[arg(short, long)]
        name: String,
    },
    /// File a collection under another folder
    Move {
        /// Collection ID
        id: String,
        /// Destination folder ID (omit to unfile)
        #[arg(short, long)]
        to: Option<String>,
    },
    /// Add a collection to the study pool
    Select {
        /// Collection ID
        id: String,
    },
    /// Remove a collection from the study pool
    Unselect {
        /// Collection ID
        id: String,
    },
    /// Show the folder path of a collection
    Path {
        /// Collection ID
        id: String,
    },
    /// Delete a collection and its cards
    Delete {
        /// Collection ID
        id: String,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

/// Execute collection commands
pub async fn execute(
    args: &CollectionArgs,
    config: AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let ctx = super::open_context(config).await?;
    let library = &ctx.library;

    match &args.command {
        CollectionCommand::List {
            folder,
            root,
            selected,
        } => {
            let collections = if *selected {
                library.get_selected_collections().await
            } else if folder.is_some() || *root {
                library
                    .get_collections_by_folder_id(&super::scope(folder.as_ref()))
                    .await
            } else {
                library.get_collections().await
            };
            let rows: Vec<CollectionRow> = collections.iter().map(CollectionRow::from).collect();
            output::print_list(&rows, format);
        }
        CollectionCommand::Create {
            name,
            folder,
            selected,
        } => {
            let name = NameInput::parse(name)?;
            let id = library
                .create_collection(&name, super::scope(folder.as_ref()), ctx.owner(), *selected)
                .await
                .ok_or_else(|| AppError::internal("Collection creation failed; see the log"))?;
            output::print_success(&format!("Collection '{name}' created"));
            output::print_kv("ID", id.as_str());
        }
        CollectionCommand::Rename { id, name } => {
            let name = NameInput::parse(name)?;
            let id = CollectionId::new(id);
            super::ensure_applied(library.rename_collection(&id, &name).await, "Rename")?;
            output::print_success(&format!("Collection renamed to '{name}'"));
        }
        CollectionCommand::Move { id, to } => {
            let destination = super::scope(to.as_ref());
            super::ensure_applied(
                library
                    .move_collection(&CollectionId::new(id), &destination)
                    .await,
                "Move",
            )?;
            output::print_success(&format!("Collection moved to {destination}"));
        }
        CollectionCommand::Select { id } => {
            super::ensure_applied(
                library.set_selected(&CollectionId::new(id), true).await,
                "Select",
            )?;
            output::print_success("Collection added to the study pool");
        }
        CollectionCommand::Unselect { id } => {
            super::ensure_applied(
                library.set_selected(&CollectionId::new(id), false).await,
                "Unselect",
            )?;
            output::print_success("Collection removed from the study pool");
        }
        CollectionCommand::Path { id } => {
            let breadcrumb = ctx.tree.collection_path(&CollectionId::new(id)).await?;
            match format {
                OutputFormat::Json => output::print_json(&breadcrumb),
                OutputFormat::Table if breadcrumb.is_empty() => println!("(unfiled)"),
                OutputFormat::Table => println!("{}", breadcrumb.display_path()),
            }
        }
        CollectionCommand::Delete { id, force } => {
            let id = CollectionId::new(id);
            let collection = library
                .get_collection_by_id(&id)
                .await
                .ok_or_else(|| AppError::not_found(format!("Collection {id} not found")))?;
            let cards = library.get_cards_by_collection(&id).await.len();

            let prompt = format!("Delete '{}' and its {cards} cards?", collection.name);
            if !super::confirm(&prompt, *force)? {
                println!("Cancelled.");
                return Ok(());
            }

            super::ensure_applied(library.delete_collection(&id).await, "Delete")?;
            output::print_success(&format!("Collection '{}' deleted", collection.name));
        }
    }

    Ok(())
}
