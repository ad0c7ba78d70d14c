//! Repository implementations over the SQLite store.

pub mod card;
pub mod collection;
pub mod folder;

pub use card::CardRepository;
pub use collection::CollectionRepository;
pub use folder::{FolderDeletion, FolderRepository};
