//! Folder management CLI commands.

use clap::{Args, Subcommand};

use flashbox_core::config::AppConfig;
use flashbox_core::error::AppError;
use flashbox_core::types::FolderId;
use flashbox_entity::folder::FolderScope;

use crate::input::NameInput;
use crate::output::{self, CollectionRow, FolderRow, OutputFormat};

/// Arguments for folder commands
#[derive(Debug, Args)]
pub struct FolderArgs {
    /// Folder subcommand
    #[command(subcommand)]
    pub command: FolderCommand,
}

/// Folder subcommands
#[derive(Debug, Subcommand)]
pub enum FolderCommand {
    /// List folders directly under a parent (root when omitted)
    List {
        /// Parent folder ID
        #[arg(short, long)]
        parent: Option<String>,
    },
    /// Show the folders and collections directly under a folder
    Show {
        /// Folder ID (root when omitted)
        id: Option<String>,
    },
    /// Create a new folder
    Create {
        /// Folder name
        #[arg(short, long)]
        name: String,
        /// Parent folder ID (omit for root)
        #[arg(short, long)]
        parent: Option<String>,
    },
    /// Rename a folder
    Rename {
        /// Folder ID
        id: String,
        /// New name
        #[arg(short, long)]
        name: String,
    },
    /// Move a folder under another folder
    Move {
        /// Folder ID
        id: String,
        /// Destination folder ID (omit to move to the root)
        #[arg(short, long)]
        to: Option<String>,
    },
    /// Delete a folder with everything below it
    Delete {
        /// Folder ID
        id: String,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
    /// Show the folder tree
    Tree {
        /// Start below this folder instead of the root
        #[arg(short, long)]
        root: Option<String>,
    },
    /// Show the breadcrumb path of a folder
    Path {
        /// Folder ID
        id: String,
    },
    /// List the valid destinations for moving a folder
    Destinations {
        /// Folder ID
        id: String,
    },
}

/// Execute folder commands
pub async fn execute(
    args: &FolderArgs,
    config: AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let ctx = super::open_context(config).await?;
    let library = &ctx.library;

    match &args.command {
        FolderCommand::List { parent } => {
            let folders = library
                .get_folders_by_parent_id(&super::scope(parent.as_ref()))
                .await;
            let rows: Vec<FolderRow> = folders.iter().map(FolderRow::from).collect();
            output::print_list(&rows, format);
        }
        FolderCommand::Show { id } => {
            let contents = ctx.tree.contents(&super::scope(id.as_ref())).await?;
            match format {
                OutputFormat::Json => output::print_json(&contents),
                OutputFormat::Table => {
                    let folders: Vec<FolderRow> =
                        contents.folders.iter().map(FolderRow::from).collect();
                    let collections: Vec<CollectionRow> =
                        contents.collections.iter().map(CollectionRow::from).collect();
                    println!("Folders:");
                    output::print_list(&folders, format);
                    println!("Collections:");
                    output::print_list(&collections, format);
                }
            }
        }
        FolderCommand::Create { name, parent } => {
            let name = NameInput::parse(name)?;
            let id = library
                .create_folder(&name, super::scope(parent.as_ref()), ctx.owner())
                .await
                .ok_or_else(|| AppError::internal("Folder creation failed; see the log"))?;
            output::print_success(&format!("Folder '{name}' created"));
            output::print_kv("ID", id.as_str());
        }
        FolderCommand::Rename { id, name } => {
            let name = NameInput::parse(name)?;
            let id = FolderId::new(id);
            super::ensure_applied(library.rename_folder(&id, &name).await, "Rename")?;
            output::print_success(&format!("Folder renamed to '{name}'"));
        }
        FolderCommand::Move { id, to } => {
            let id = FolderId::new(id);
            let destination = super::scope(to.as_ref());
            if let FolderScope::Under(target) = &destination {
                let allowed = ctx.tree.move_destinations(&id).await?;
                if !allowed.iter().any(|f| &f.id == target) {
                    return Err(AppError::validation(format!(
                        "Folder {target} is not a valid destination for {id}"
                    )));
                }
            }
            super::ensure_applied(library.move_folder(&id, &destination).await, "Move")?;
            output::print_success(&format!("Folder moved to {destination}"));
        }
        FolderCommand::Delete { id, force } => {
            let id = FolderId::new(id);
            let folder = library
                .get_folder_by_id(&id)
                .await
                .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))?;

            let prompt = format!(
                "Delete '{}' with all its subfolders, collections, and cards?",
                folder.name
            );
            if !super::confirm(&prompt, *force)? {
                println!("Cancelled.");
                return Ok(());
            }

            super::ensure_applied(library.delete_folder(&id).await, "Delete")?;
            output::print_success(&format!("Folder '{}' deleted", folder.name));
        }
        FolderCommand::Tree { root } => {
            let tree = ctx.tree.tree(&super::scope(root.as_ref())).await?;
            match format {
                OutputFormat::Json => output::print_json(&tree),
                OutputFormat::Table => {
                    if tree.roots.is_empty() {
                        println!("No folders.");
                    } else {
                        output::print_tree(&tree.roots, 0);
                        println!("{} folders", tree.total_folders);
                    }
                }
            }
        }
        FolderCommand::Path { id } => {
            let breadcrumb = library.get_breadcrumb(&FolderId::new(id)).await;
            match format {
                OutputFormat::Json => output::print_json(&breadcrumb),
                OutputFormat::Table if breadcrumb.is_empty() => {
                    output::print_warning("Folder not found")
                }
                OutputFormat::Table => println!("{}", breadcrumb.display_path()),
            }
        }
        FolderCommand::Destinations { id } => {
            let folders = ctx.tree.move_destinations(&FolderId::new(id)).await?;
            let rows: Vec<FolderRow> = folders.iter().map(FolderRow::from).collect();
            if format == OutputFormat::Table {
                println!("The root is always a valid destination.");
            }
            output::print_list(&rows, format);
        }
    }

    Ok(())
}
