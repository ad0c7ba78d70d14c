//! Folder domain entities.

pub mod model;
pub mod scope;
pub mod tree;

pub use model::{CreateFolder, Folder};
pub use scope::FolderScope;
pub use tree::{Breadcrumb, FolderNode, FolderTree};
