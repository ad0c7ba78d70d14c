//! Flashcard domain entities.

pub mod model;

pub use model::{Card, CardText, CreateCard};
