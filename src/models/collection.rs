// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Collection and embedded card models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum collection name length, in characters.
pub const MAX_COLLECTION_NAME_CHARS: usize = 20;

/// A user's card collection (`collections` collection).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    /// Store-generated ID (also used as document ID)
    pub id: String,
    /// Owning account ID
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub cards: Vec<Card>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A card entry embedded in a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// Scryfall catalog ID, unique within a collection
    pub scryfall_id: String,
    pub name: String,
    /// Card image URL
    pub card_url: String,
    pub count: u32,
    /// When copies of this card were last added
    pub added_at: DateTime<Utc>,
}

/// Outcome of [`Collection::add_card`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAddition {
    /// An existing entry's count was increased.
    Incremented,
    /// A new entry was appended.
    Appended,
}

impl Collection {
    pub fn new(id: String, user_id: String, name: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            name,
            cards: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn rename(&mut self, name: &str) {
        self.name = name.to_string();
        self.updated_at = Utc::now();
    }

    /// Add copies of a card: additive on an existing entry, append otherwise.
    pub fn add_card(&mut self, card: Card) -> CardAddition {
        let now = Utc::now();
        self.updated_at = now;

        match self
            .cards
            .iter_mut()
            .find(|c| c.scryfall_id == card.scryfall_id)
        {
            Some(existing) => {
                existing.count = existing.count.saturating_add(card.count);
                existing.added_at = now;
                CardAddition::Incremented
            }
            None => {
                self.cards.push(Card {
                    added_at: now,
                    ..card
                });
                CardAddition::Appended
            }
        }
    }

    /// Overwrite a card's count. Returns false if the card is not present.
    pub fn set_card_count(&mut self, scryfall_id: &str, count: u32) -> bool {
        match self.cards.iter_mut().find(|c| c.scryfall_id == scryfall_id) {
            Some(existing) => {
                existing.count = count;
                self.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    /// Pull a card by catalog ID. Returns false if it was not present.
    pub fn remove_card(&mut self, scryfall_id: &str) -> bool {
        let before = self.cards.len();
        self.cards.retain(|c| c.scryfall_id != scryfall_id);
        self.updated_at = Utc::now();
        self.cards.len() != before
    }
}

/// Collection IDs are 24 hexadecimal characters.
pub fn is_valid_collection_id(id: &str) -> bool {
    id.len() == 24 && hex::decode(id).is_ok()
}

/// Names are 1..=20 characters on a single line. Whitespace-only is allowed.
pub fn is_valid_collection_name(name: &str) -> bool {
    let chars = name.chars().count();
    (1..=MAX_COLLECTION_NAME_CHARS).contains(&chars) && !name.contains('\n')
}
