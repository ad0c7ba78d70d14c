//! # flashbox-entity
//!
//! Domain entity models for Flashbox. Every row struct in this crate maps a
//! table of the embedded store; column names keep the camelCase spelling of
//! the persisted schema (`parentFolderId`, `createdByUser`, ...).

pub mod card;
pub mod collection;
pub mod folder;
