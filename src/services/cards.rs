// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Card operations within a collection.

use std::sync::Arc;

use chrono::Utc;

use crate::db::CollectionStore;
use crate::error::AppError;
use crate::models::{Card, CardAddition};
use crate::services::collections::{owned_collection, validate_id};

/// Copies of a card to add.
#[derive(Debug, Clone)]
pub struct NewCard {
    pub scryfall_id: String,
    pub name: String,
    pub card_url: String,
    pub count: u32,
}

pub struct CardsService {
    collections: Arc<dyn CollectionStore>,
}

impl CardsService {
    pub fn new(collections: Arc<dyn CollectionStore>) -> Self {
        Self { collections }
    }

    pub async fn list(&self, user_id: &str, collection_id: &str) -> Result<Vec<Card>, AppError> {
        validate_id(collection_id)?;
        Ok(owned_collection(self.collections.as_ref(), user_id, collection_id)
            .await?
            .cards)
    }

    pub async fn add(
        &self,
        user_id: &str,
        collection_id: &str,
        card: NewCard,
    ) -> Result<CardAddition, AppError> {
        validate_id(collection_id)?;
        if card.scryfall_id.is_empty() || card.name.is_empty() || card.card_url.is_empty() {
            return Err(AppError::BadRequest(
                "scryfall_id, name and card_url are required".to_string(),
            ));
        }
        if card.count == 0 {
            return Err(AppError::BadRequest("count must be at least 1".to_string()));
        }
        owned_collection(self.collections.as_ref(), user_id, collection_id).await?;

        let outcome = self
            .collections
            .add_card(
                collection_id,
                &Card {
                    scryfall_id: card.scryfall_id,
                    name: card.name,
                    card_url: card.card_url,
                    count: card.count,
                    added_at: Utc::now(),
                },
            )
            .await?;

        tracing::debug!(user_id, collection_id, ?outcome, "Card added");
        Ok(outcome)
    }

    pub async fn set_count(
        &self,
        user_id: &str,
        collection_id: &str,
        scryfall_id: &str,
        count: u32,
    ) -> Result<(), AppError> {
        validate_id(collection_id)?;
        owned_collection(self.collections.as_ref(), user_id, collection_id).await?;
        self.collections
            .set_card_count(collection_id, scryfall_id, count)
            .await
    }

    /// Removing a card that is not in the collection succeeds.
    pub async fn delete(
        &self,
        user_id: &str,
        collection_id: &str,
        scryfall_id: &str,
    ) -> Result<(), AppError> {
        validate_id(collection_id)?;
        owned_collection(self.collections.as_ref(), user_id, collection_id).await?;
        if !self
            .collections
            .delete_card(collection_id, scryfall_id)
            .await?
        {
            tracing::debug!(collection_id, scryfall_id, "Card already absent");
        }
        Ok(())
    }
}
