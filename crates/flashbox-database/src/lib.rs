//! # flashbox-database
//!
//! Embedded SQLite store for Flashbox: the [`Store`] handle and its open
//! lifecycle, schema migrations, concrete repositories for folders,
//! collections, and cards, key-value settings stores, and the first-run
//! seed loader.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod seed;
pub mod settings;

pub use connection::{Store, StorePhase};
pub use seed::{SeedData, SeedLoader, SeedOutcome};
