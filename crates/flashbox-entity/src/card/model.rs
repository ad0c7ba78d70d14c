//! Card entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use flashbox_core::types::{CardId, CollectionId};

/// A single front/back flashcard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct Card {
    /// Unique card identifier.
    pub id: CardId,
    /// Prompt side.
    pub front_text: String,
    /// Answer side.
    pub back_text: String,
    /// Owning collection.
    pub collection_id: CollectionId,
    /// Owning user context.
    pub created_by_user: i64,
}

/// The editable text of a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardText {
    /// Prompt side.
    pub front_text: String,
    /// Answer side.
    pub back_text: String,
}

impl CardText {
    /// Build a front/back pair.
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front_text: front.into(),
            back_text: back.into(),
        }
    }
}

/// Data required to create a new card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCard {
    /// Card text.
    pub text: CardText,
    /// Owning collection.
    pub collection_id: CollectionId,
    /// Owning user context.
    pub created_by_user: i64,
}

impl CreateCard {
    /// Build a creation request.
    pub fn new(text: CardText, collection_id: CollectionId, created_by_user: i64) -> Self {
        Self {
            text,
            collection_id,
            created_by_user,
        }
    }
}
