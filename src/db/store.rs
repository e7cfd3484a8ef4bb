// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storage traits implemented by each backend.
//!
//! Operations that touch both an account and one of its collections are
//! applied as a unit by the backend, so the account's reference list and
//! the collection documents never drift apart.

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{Account, Card, CardAddition, Collection, CollectionRef, TokenRecord};

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account.
    ///
    /// Fails with [`AppError::Conflict`] if the email or Telegram ID is
    /// already taken.
    async fn create_account(&self, account: &Account) -> Result<(), AppError>;

    async fn get_account(&self, id: &str) -> Result<Option<Account>, AppError>;

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, AppError>;

    async fn find_account_by_telegram_id(
        &self,
        telegram_id: i64,
    ) -> Result<Option<Account>, AppError>;
}

#[async_trait]
pub trait CollectionStore: Send + Sync {
    async fn get_collection(&self, id: &str) -> Result<Option<Collection>, AppError>;

    /// Insert a collection and append `{id, name}` to the owner's list.
    ///
    /// Fails with [`AppError::NotFound`] if the owner does not exist.
    async fn create_collection(&self, collection: &Collection) -> Result<(), AppError>;

    /// Rename a collection owned by `user_id`, updating both the collection
    /// and the owner's reference.
    async fn rename_collection(
        &self,
        user_id: &str,
        collection_id: &str,
        name: &str,
    ) -> Result<CollectionRef, AppError>;

    /// Delete a collection owned by `user_id` and pull the owner's reference.
    async fn delete_collection(&self, user_id: &str, collection_id: &str) -> Result<(), AppError>;

    /// Add copies of a card, merging with an existing entry.
    async fn add_card(&self, collection_id: &str, card: &Card) -> Result<CardAddition, AppError>;

    /// Overwrite a card's count. [`AppError::NotFound`] if the card is absent.
    async fn set_card_count(
        &self,
        collection_id: &str,
        scryfall_id: &str,
        count: u32,
    ) -> Result<(), AppError>;

    /// Remove a card. Returns whether anything was removed.
    async fn delete_card(&self, collection_id: &str, scryfall_id: &str)
        -> Result<bool, AppError>;
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn add_token(&self, record: &TokenRecord) -> Result<(), AppError>;

    async fn get_token(&self, jti: &str) -> Result<Option<TokenRecord>, AppError>;

    /// Mark a session revoked. Returns false if no record exists for `jti`.
    async fn revoke_token(&self, jti: &str) -> Result<bool, AppError>;
}

/// A complete storage backend.
pub trait Store: AccountStore + CollectionStore + TokenStore {}

impl<T: AccountStore + CollectionStore + TokenStore> Store for T {}

pub(crate) fn collection_not_found() -> AppError {
    AppError::NotFound("Collection not found".to_string())
}

pub(crate) fn card_not_found() -> AppError {
    AppError::NotFound("Card not found".to_string())
}

pub(crate) fn account_not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}
