//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use flashbox_entity::card::Card;
use flashbox_entity::collection::Collection;
use flashbox_entity::folder::{Folder, FolderNode};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Folder display row
#[derive(Debug, Serialize, Tabled)]
pub struct FolderRow {
    /// Folder ID
    pub id: String,
    /// Name
    pub name: String,
    /// Parent folder ID
    pub parent: String,
}

impl From<&Folder> for FolderRow {
    fn from(f: &Folder) -> Self {
        Self {
            id: f.id.to_string(),
            name: f.name.clone(),
            parent: f
                .parent_folder_id
                .as_ref()
                .map_or_else(|| "-".to_string(), ToString::to_string),
        }
    }
}

/// Collection display row
#[derive(Debug, Serialize, Tabled)]
pub struct CollectionRow {
    /// Collection ID
    pub id: String,
    /// Name
    pub name: String,
    /// Folder ID
    pub folder: String,
    /// In the study pool
    pub selected: bool,
}

impl From<&Collection> for CollectionRow {
    fn from(c: &Collection) -> Self {
        Self {
            id: c.id.to_string(),
            name: c.name.clone(),
            folder: c
                .folder_id
                .as_ref()
                .map_or_else(|| "-".to_string(), ToString::to_string),
            selected: c.selected,
        }
    }
}

/// Card display row
#[derive(Debug, Serialize, Tabled)]
pub struct CardRow {
    /// Card ID
    pub id: String,
    /// Front side
    pub front: String,
    /// Back side
    pub back: String,
}

impl From<&Card> for CardRow {
    fn from(c: &Card) -> Self {
        Self {
            id: c.id.to_string(),
            front: c.front_text.clone(),
            back: c.back_text.clone(),
        }
    }
}

/// Print a list of items in the selected format
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No results found.");
            } else {
                println!("{}", Table::new(items));
            }
        }
        OutputFormat::Json => print_json(items),
    }
}

/// Print any serializable value as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => print_error(&format!("Failed to encode output: {e}")),
    }
}

/// Print a folder forest as an indented outline.
pub fn print_tree(nodes: &[FolderNode], depth: usize) {
    for node in nodes {
        let count = match node.collection_count {
            0 => String::new(),
            n => format!(" ({n} collections)"),
        };
        println!("{}{}{}  [{}]", "  ".repeat(depth), node.name, count, node.id);
        print_tree(&node.children, depth + 1);
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {msg}");
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {}", format!("{key}:"), value);
}
