//! Study pool assembly and random card draws.

use std::sync::Arc;

use rand::seq::SliceRandom;
use tracing::debug;

use flashbox_core::error::AppError;
use flashbox_core::types::CardId;
use flashbox_database::repositories::CardRepository;
use flashbox_entity::card::Card;

/// Serves cards from every selected collection.
#[derive(Debug, Clone)]
pub struct StudyService {
    card_repo: Arc<CardRepository>,
}

impl StudyService {
    /// Creates a new study service.
    pub fn new(card_repo: Arc<CardRepository>) -> Self {
        Self { card_repo }
    }

    /// All cards of the selected collections.
    pub async fn pool(&self) -> Result<Vec<Card>, AppError> {
        self.card_repo.find_study_pool().await
    }

    /// A random card from the pool, or `None` when nothing is selected.
    pub async fn draw(&self) -> Result<Option<Card>, AppError> {
        self.draw_after(None).await
    }

    /// A random card, avoiding `previous` whenever another card is available.
    pub async fn draw_after(&self, previous: Option<&CardId>) -> Result<Option<Card>, AppError> {
        let pool = self.pool().await?;
        let candidates: Vec<&Card> = match previous {
            Some(prev) if pool.len() > 1 => pool.iter().filter(|c| &c.id != prev).collect(),
            _ => pool.iter().collect(),
        };

        let card = candidates.choose(&mut rand::thread_rng()).map(|c| (*c).clone());
        debug!(pool = pool.len(), drawn = ?card.as_ref().map(|c| &c.id), "Study card drawn");
        Ok(card)
    }
}
