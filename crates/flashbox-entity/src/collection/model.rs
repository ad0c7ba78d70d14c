//! Collection entity model.

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

use flashbox_core::types::{CollectionId, FolderId};

use crate::folder::FolderScope;

/// A named group of flashcards, optionally filed under a folder.
///
/// Cards are not embedded; they are queried on demand by collection id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// Unique collection identifier.
    pub id: CollectionId,
    /// Display name.
    pub name: String,
    /// Containing folder (null for unfiled collections).
    pub folder_id: Option<FolderId>,
    /// Owning user context.
    pub created_by_user: i64,
    /// Whether the collection's cards are in the study pool.
    pub selected: bool,
}

// `selected` is stored as an INTEGER; any non-zero value reads as selected.
impl<'r> FromRow<'r, SqliteRow> for Collection {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let selected: Option<i64> = row.try_get("selected")?;
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            folder_id: row.try_get("folderId")?,
            created_by_user: row.try_get("createdByUser")?,
            selected: selected.unwrap_or(0) != 0,
        })
    }
}

/// Data required to create a new collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCollection {
    /// Collection name.
    pub name: String,
    /// Where the collection is filed.
    pub folder: FolderScope,
    /// Owning user context.
    pub created_by_user: i64,
    /// Initial study-pool membership.
    pub selected: bool,
}

impl CreateCollection {
    /// Build a creation request.
    pub fn new(
        name: impl Into<String>,
        folder: FolderScope,
        created_by_user: i64,
        selected: bool,
    ) -> Self {
        Self {
            name: name.into(),
            folder,
            created_by_user,
            selected,
        }
    }
}
