// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account stored in Firestore (`users` collection).
///
/// An account is identified either by email + password hash or by a
/// Telegram user ID; the two identity kinds are never merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Store-generated ID (also used as document ID)
    pub id: String,
    /// Email address (email/password accounts only)
    #[serde(default)]
    pub email: Option<String>,
    /// bcrypt hash (email/password accounts only)
    #[serde(default)]
    pub password_hash: Option<String>,
    /// Telegram user ID (Telegram accounts only)
    #[serde(default)]
    pub telegram_id: Option<i64>,
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Telegram username
    #[serde(default)]
    pub username: Option<String>,
    /// Denormalized references to the collections this account owns,
    /// in creation order.
    #[serde(default)]
    pub collections: Vec<CollectionRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lightweight `{id, name}` pair cached on the account for fast listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionRef {
    pub id: String,
    pub name: String,
}

impl Account {
    /// New email/password account.
    pub fn with_email(
        id: String,
        email: String,
        password_hash: String,
        first_name: String,
        last_name: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            email: Some(email),
            password_hash: Some(password_hash),
            telegram_id: None,
            first_name,
            last_name,
            username: None,
            collections: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// New Telegram account.
    pub fn with_telegram(
        id: String,
        telegram_id: i64,
        first_name: String,
        last_name: String,
        username: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            email: None,
            password_hash: None,
            telegram_id: Some(telegram_id),
            first_name,
            last_name,
            username,
            collections: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `collection_id` is one of this account's collections.
    pub fn owns_collection(&self, collection_id: &str) -> bool {
        self.collections.iter().any(|r| r.id == collection_id)
    }

    pub fn push_collection_ref(&mut self, id: &str, name: &str) {
        self.collections.push(CollectionRef {
            id: id.to_string(),
            name: name.to_string(),
        });
        self.updated_at = Utc::now();
    }

    /// Rename the matching reference. Returns false if no reference matched.
    pub fn rename_collection_ref(&mut self, id: &str, name: &str) -> bool {
        match self.collections.iter_mut().find(|r| r.id == id) {
            Some(r) => {
                r.name = name.to_string();
                self.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    /// Pull the matching reference. Returns false if no reference matched.
    pub fn remove_collection_ref(&mut self, id: &str) -> bool {
        let before = self.collections.len();
        self.collections.retain(|r| r.id != id);
        let removed = self.collections.len() != before;
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }
}
