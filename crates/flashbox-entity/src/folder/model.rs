//! Folder entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use flashbox_core::types::FolderId;

use super::scope::FolderScope;

/// A node in the folder tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct Folder {
    /// Unique folder identifier.
    pub id: FolderId,
    /// Display name.
    pub name: String,
    /// Parent folder ID (null for root folders).
    pub parent_folder_id: Option<FolderId>,
    /// Owning user context.
    pub created_by_user: i64,
}

impl Folder {
    /// Check if this is a root folder (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_folder_id.is_none()
    }
}

/// Data required to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    /// Folder name.
    pub name: String,
    /// Where the folder is created.
    pub parent: FolderScope,
    /// Owning user context.
    pub created_by_user: i64,
}

impl CreateFolder {
    /// Build a creation request.
    pub fn new(name: impl Into<String>, parent: FolderScope, created_by_user: i64) -> Self {
        Self {
            name: name.into(),
            parent,
            created_by_user,
        }
    }
}
