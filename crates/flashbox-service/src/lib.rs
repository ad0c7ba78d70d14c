//! # flashbox-service
//!
//! Service layer for Flashbox. [`Library`] is the collaborator-facing
//! facade over the repositories and never surfaces store errors;
//! [`TreeService`] and [`StudyService`] build navigation and study views;
//! [`AppContext`] wires everything together at startup.
//!
//! Services follow constructor injection: dependencies are passed in as
//! `Arc` references.

pub mod context;
pub mod library;
mod policy;
pub mod study;
pub mod tree;

pub use context::AppContext;
pub use library::Library;
pub use study::StudyService;
pub use tree::{FolderContents, TreeService};
