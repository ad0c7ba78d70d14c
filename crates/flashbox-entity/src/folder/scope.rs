//! The position of a folder or collection in the tree.

use serde::{Deserialize, Serialize};

use flashbox_core::types::FolderId;

/// Where in the tree a folder or collection lives.
///
/// `Root` is a real, matchable position rather than a missing value: a
/// lookup for `Root` returns every top-level record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum FolderScope {
    /// Top level, no parent folder.
    #[default]
    Root,
    /// Directly inside the given folder.
    Under(FolderId),
}

impl FolderScope {
    /// The parent column value this scope is stored as.
    pub fn parent_id(&self) -> Option<&FolderId> {
        match self {
            Self::Root => None,
            Self::Under(id) => Some(id),
        }
    }
}

impl From<Option<FolderId>> for FolderScope {
    fn from(parent: Option<FolderId>) -> Self {
        match parent {
            Some(id) => Self::Under(id),
            None => Self::Root,
        }
    }
}

impl From<FolderId> for FolderScope {
    fn from(id: FolderId) -> Self {
        Self::Under(id)
    }
}

impl std::fmt::Display for FolderScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Root => f.write_str("<root>"),
            Self::Under(id) => write!(f, "{id}"),
        }
    }
}
