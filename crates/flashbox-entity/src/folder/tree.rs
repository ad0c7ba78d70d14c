//! Folder tree structures for hierarchical display.

use serde::{Deserialize, Serialize};

use flashbox_core::types::FolderId;

use super::model::Folder;

/// A node in a folder tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderNode {
    /// Folder ID.
    pub id: FolderId,
    /// Folder name.
    pub name: String,
    /// Number of collections directly inside this folder.
    pub collection_count: u64,
    /// Child folder nodes.
    pub children: Vec<FolderNode>,
}

impl FolderNode {
    /// Number of folders in this subtree, including this one.
    pub fn size(&self) -> u64 {
        1 + self.children.iter().map(FolderNode::size).sum::<u64>()
    }
}

/// A folder forest rooted at a scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderTree {
    /// The root node(s) of the tree.
    pub roots: Vec<FolderNode>,
    /// Total number of folders in the tree.
    pub total_folders: u64,
}

impl FolderTree {
    /// Build a tree from its root nodes.
    pub fn from_roots(roots: Vec<FolderNode>) -> Self {
        let total_folders = roots.iter().map(FolderNode::size).sum();
        Self {
            roots,
            total_folders,
        }
    }
}

/// Ordered ancestor chain from the root down to a folder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Breadcrumb {
    /// Folders, root first.
    pub folders: Vec<Folder>,
}

impl Breadcrumb {
    /// Wrap a root-first folder chain.
    pub fn new(folders: Vec<Folder>) -> Self {
        Self { folders }
    }

    /// Check if the chain is empty (root level).
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    /// Number of folders in the chain.
    pub fn len(&self) -> usize {
        self.folders.len()
    }

    /// The folder names joined as a display path (`Languages / Kazakh`).
    pub fn display_path(&self) -> String {
        self.folders
            .iter()
            .map(|f| f.name.as_str())
            .collect::<Vec<_>>()
            .join(" / ")
    }
}
