//! # flashbox-core
//!
//! Core crate for Flashbox. Contains the unified error system, configuration
//! schemas, typed identifiers, and the settings-store trait.
//!
//! This crate has **no** internal dependencies on other Flashbox crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
