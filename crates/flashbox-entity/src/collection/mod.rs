//! Collection domain entities.

pub mod model;

pub use model::{Collection, CreateCollection};
