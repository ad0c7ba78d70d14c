//! Core type definitions used across the Flashbox workspace.

pub mod id;

pub use id::*;
