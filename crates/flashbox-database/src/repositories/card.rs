//! Card repository implementation.

use sqlx::{Executor, Sqlite};
use tracing::info;

use flashbox_core::error::{AppError, ErrorKind};
use flashbox_core::result::AppResult;
use flashbox_core::types::{CardId, CollectionId};
use flashbox_entity::card::{Card, CardText, CreateCard};

use crate::connection::Store;

/// Repository for flashcards.
#[derive(Debug, Clone)]
pub struct CardRepository {
    store: Store,
}

impl CardRepository {
    /// Create a new card repository.
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Find a card by ID.
    pub async fn find_by_id(&self, id: &CardId) -> AppResult<Option<Card>> {
        let pool = self.store.pool()?;
        sqlx::query_as::<_, Card>("SELECT * FROM cards WHERE id = ?1")
            .bind(id)
            .fetch_optional(&pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find card", e))
    }

    /// List the cards of a collection in insertion order.
    pub async fn find_by_collection(&self, collection_id: &CollectionId) -> AppResult<Vec<Card>> {
        let pool = self.store.pool()?;
        sqlx::query_as::<_, Card>("SELECT * FROM cards WHERE collectionId = ?1 ORDER BY rowid ASC")
            .bind(collection_id)
            .fetch_all(&pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list cards", e))
    }

    /// All cards belonging to selected collections.
    pub async fn find_study_pool(&self) -> AppResult<Vec<Card>> {
        let pool = self.store.pool()?;
        sqlx::query_as::<_, Card>(
            "SELECT c.* FROM cards c \
             JOIN collections col ON col.id = c.collectionId \
             WHERE col.selected != 0 \
             ORDER BY c.rowid ASC",
        )
        .fetch_all(&pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load study pool", e))
    }

    /// Create a card. Fails with `NotFound` when the collection is missing.
    pub async fn create(&self, data: &CreateCard) -> AppResult<Card> {
        let pool = self.store.pool()?;
        let id = CardId::generate();
        let card = insert_card(&pool, &id, data).await.map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::not_found(format!("Collection {} not found", data.collection_id))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create card", e),
        })?;

        info!(card_id = %card.id, collection_id = %card.collection_id, "Card created");
        Ok(card)
    }

    /// Replace both sides of a card.
    pub async fn update(&self, id: &CardId, text: &CardText) -> AppResult<Card> {
        let pool = self.store.pool()?;
        let card = sqlx::query_as::<_, Card>(
            "UPDATE cards SET frontText = ?2, backText = ?3 WHERE id = ?1 RETURNING *",
        )
        .bind(id)
        .bind(&text.front_text)
        .bind(&text.back_text)
        .fetch_optional(&pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update card", e))?
        .ok_or_else(|| AppError::not_found(format!("Card {id} not found")))?;

        info!(card_id = %id, "Card updated");
        Ok(card)
    }

    /// Delete a card. Returns `false` when no such card existed.
    pub async fn delete(&self, id: &CardId) -> AppResult<bool> {
        let pool = self.store.pool()?;
        let result = sqlx::query("DELETE FROM cards WHERE id = ?1")
            .bind(id)
            .execute(&pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete card", e))?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(card_id = %id, "Card deleted");
        }
        Ok(deleted)
    }
}

/// Insert one card row. Shared by the repository and the seed loader.
pub(crate) async fn insert_card<'e, E>(
    executor: E,
    id: &CardId,
    data: &CreateCard,
) -> Result<Card, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Card>(
        "INSERT INTO cards (id, frontText, backText, collectionId, createdByUser) \
         VALUES (?1, ?2, ?3, ?4, ?5) RETURNING *",
    )
    .bind(id)
    .bind(&data.text.front_text)
    .bind(&data.text.back_text)
    .bind(&data.collection_id)
    .bind(data.created_by_user)
    .fetch_one(executor)
    .await
}
