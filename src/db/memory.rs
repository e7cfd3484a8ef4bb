// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory storage backend.
//!
//! Used by the test suite and for local runs without a Firestore emulator.
//! Multi-document updates happen under a single write lock, so they are
//! atomic with respect to every other operation. Data is lost on drop.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::db::store::{
    account_not_found, card_not_found, collection_not_found, AccountStore, CollectionStore,
    TokenStore,
};
use crate::error::AppError;
use crate::models::{Account, Card, CardAddition, Collection, CollectionRef, TokenRecord};

#[derive(Debug, Default)]
struct Tables {
    accounts: HashMap<String, Account>,
    collections: HashMap<String, Collection>,
    tokens: HashMap<String, TokenRecord>,
}

/// HashMap-backed store, cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct MemoryDb {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored collection documents (for tests).
    pub async fn collection_count(&self) -> usize {
        self.tables.read().await.collections.len()
    }
}

#[async_trait]
impl AccountStore for MemoryDb {
    async fn create_account(&self, account: &Account) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;

        let taken = tables.accounts.values().any(|existing| {
            (account.email.is_some() && existing.email == account.email)
                || (account.telegram_id.is_some() && existing.telegram_id == account.telegram_id)
        });
        if taken {
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        tables.accounts.insert(account.id.clone(), account.clone());
        Ok(())
    }

    async fn get_account(&self, id: &str) -> Result<Option<Account>, AppError> {
        Ok(self.tables.read().await.accounts.get(id).cloned())
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        Ok(self
            .tables
            .read()
            .await
            .accounts
            .values()
            .find(|a| a.email.as_deref() == Some(email))
            .cloned())
    }

    async fn find_account_by_telegram_id(
        &self,
        telegram_id: i64,
    ) -> Result<Option<Account>, AppError> {
        Ok(self
            .tables
            .read()
            .await
            .accounts
            .values()
            .find(|a| a.telegram_id == Some(telegram_id))
            .cloned())
    }
}

#[async_trait]
impl CollectionStore for MemoryDb {
    async fn get_collection(&self, id: &str) -> Result<Option<Collection>, AppError> {
        Ok(self.tables.read().await.collections.get(id).cloned())
    }

    async fn create_collection(&self, collection: &Collection) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;

        let owner = tables
            .accounts
            .get_mut(&collection.user_id)
            .ok_or_else(account_not_found)?;
        owner.push_collection_ref(&collection.id, &collection.name);

        tables
            .collections
            .insert(collection.id.clone(), collection.clone());
        Ok(())
    }

    async fn rename_collection(
        &self,
        user_id: &str,
        collection_id: &str,
        name: &str,
    ) -> Result<CollectionRef, AppError> {
        let mut tables = self.tables.write().await;
        let Tables {
            accounts,
            collections,
            ..
        } = &mut *tables;

        let owner = accounts.get_mut(user_id).ok_or_else(account_not_found)?;
        if !owner.owns_collection(collection_id) {
            return Err(collection_not_found());
        }
        let collection = collections
            .get_mut(collection_id)
            .ok_or_else(collection_not_found)?;

        owner.rename_collection_ref(collection_id, name);
        collection.rename(name);

        Ok(CollectionRef {
            id: collection.id.clone(),
            name: collection.name.clone(),
        })
    }

    async fn delete_collection(&self, user_id: &str, collection_id: &str) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let Tables {
            accounts,
            collections,
            ..
        } = &mut *tables;

        let owner = accounts.get_mut(user_id).ok_or_else(account_not_found)?;
        if !owner.remove_collection_ref(collection_id) {
            return Err(collection_not_found());
        }
        collections.remove(collection_id);
        Ok(())
    }

    async fn add_card(&self, collection_id: &str, card: &Card) -> Result<CardAddition, AppError> {
        let mut tables = self.tables.write().await;
        let collection = tables
            .collections
            .get_mut(collection_id)
            .ok_or_else(collection_not_found)?;
        Ok(collection.add_card(card.clone()))
    }

    async fn set_card_count(
        &self,
        collection_id: &str,
        scryfall_id: &str,
        count: u32,
    ) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let collection = tables
            .collections
            .get_mut(collection_id)
            .ok_or_else(collection_not_found)?;
        if collection.set_card_count(scryfall_id, count) {
            Ok(())
        } else {
            Err(card_not_found())
        }
    }

    async fn delete_card(
        &self,
        collection_id: &str,
        scryfall_id: &str,
    ) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let collection = tables
            .collections
            .get_mut(collection_id)
            .ok_or_else(collection_not_found)?;
        Ok(collection.remove_card(scryfall_id))
    }
}

#[async_trait]
impl TokenStore for MemoryDb {
    async fn add_token(&self, record: &TokenRecord) -> Result<(), AppError> {
        self.tables
            .write()
            .await
            .tokens
            .insert(record.jti.clone(), record.clone());
        Ok(())
    }

    async fn get_token(&self, jti: &str) -> Result<Option<TokenRecord>, AppError> {
        Ok(self.tables.read().await.tokens.get(jti).cloned())
    }

    async fn revoke_token(&self, jti: &str) -> Result<bool, AppError> {
        match self.tables.write().await.tokens.get_mut(jti) {
            Some(record) => {
                record.revoked = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const OWNER: &str = "64a9b66b2db8b91234a6e8e0";
    const COLL: &str = "64a9b66b2db8b91234a6e8e1";

    async fn db_with_owner() -> MemoryDb {
        let db = MemoryDb::new();
        db.create_account(&Account::with_email(
            OWNER.to_string(),
            "owner@example.com".to_string(),
            "hash".to_string(),
            "Owner".to_string(),
            String::new(),
        ))
        .await
        .unwrap();
        db
    }

    fn card(id: &str, count: u32) -> Card {
        Card {
            scryfall_id: id.to_string(),
            name: "Island".to_string(),
            card_url: "https://example.com/island.jpg".to_string(),
            count,
            added_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let db = db_with_owner().await;
        let dup = Account::with_email(
            "64a9b66b2db8b91234a6e8ff".to_string(),
            "owner@example.com".to_string(),
            "hash".to_string(),
            "Other".to_string(),
            String::new(),
        );

        let err = db.create_account(&dup).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_duplicate_telegram_id_conflicts() {
        let db = MemoryDb::new();
        let first = Account::with_telegram("a".repeat(24), 42, "T".into(), String::new(), None);
        let second = Account::with_telegram("b".repeat(24), 42, "T".into(), String::new(), None);

        db.create_account(&first).await.unwrap();
        let err = db.create_account(&second).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_collection_lifecycle_keeps_refs_in_sync() {
        let db = db_with_owner().await;
        let coll = Collection::new(COLL.to_string(), OWNER.to_string(), "Modern".to_string());

        db.create_collection(&coll).await.unwrap();
        let owner = db.get_account(OWNER).await.unwrap().unwrap();
        assert_eq!(owner.collections.len(), 1);
        assert_eq!(owner.collections[0].name, "Modern");

        let renamed = db.rename_collection(OWNER, COLL, "Legacy").await.unwrap();
        assert_eq!(renamed.name, "Legacy");
        let owner = db.get_account(OWNER).await.unwrap().unwrap();
        assert_eq!(owner.collections[0].name, "Legacy");
        let stored = db.get_collection(COLL).await.unwrap().unwrap();
        assert_eq!(stored.name, "Legacy");

        db.delete_collection(OWNER, COLL).await.unwrap();
        let owner = db.get_account(OWNER).await.unwrap().unwrap();
        assert!(owner.collections.is_empty());
        assert_eq!(db.collection_count().await, 0);
    }

    #[tokio::test]
    async fn test_create_collection_without_owner_fails() {
        let db = MemoryDb::new();
        let coll = Collection::new(COLL.to_string(), OWNER.to_string(), "Modern".to_string());

        let err = db.create_collection(&coll).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(db.collection_count().await, 0);
    }

    #[tokio::test]
    async fn test_rename_requires_reference() {
        let db = db_with_owner().await;
        let err = db.rename_collection(OWNER, COLL, "X").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_card_operations() {
        let db = db_with_owner().await;
        let coll = Collection::new(COLL.to_string(), OWNER.to_string(), "Modern".to_string());
        db.create_collection(&coll).await.unwrap();

        db.add_card(COLL, &card("X", 2)).await.unwrap();
        assert_eq!(
            db.add_card(COLL, &card("X", 3)).await.unwrap(),
            CardAddition::Incremented
        );
        let stored = db.get_collection(COLL).await.unwrap().unwrap();
        assert_eq!(stored.cards[0].count, 5);

        db.set_card_count(COLL, "X", 1).await.unwrap();
        let err = db.set_card_count(COLL, "Y", 1).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        assert!(db.delete_card(COLL, "X").await.unwrap());
        assert!(!db.delete_card(COLL, "X").await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_accumulate() {
        let db = db_with_owner().await;
        db.create_collection(&Collection::new(
            COLL.to_string(),
            OWNER.to_string(),
            "Busy".to_string(),
        ))
        .await
        .unwrap();

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..8 {
            let db = db.clone();
            tasks.spawn(async move { db.add_card(COLL, &card("X", 2)).await });
        }
        while let Some(result) = tasks.join_next().await {
            result.unwrap().unwrap();
        }

        let stored = db.get_collection(COLL).await.unwrap().unwrap();
        assert_eq!(stored.cards.len(), 1);
        assert_eq!(stored.cards[0].count, 16);
    }

    #[tokio::test]
    async fn test_revoke_token() {
        let db = MemoryDb::new();
        let now = Utc::now();
        db.add_token(&TokenRecord {
            jti: "j1".to_string(),
            user_id: OWNER.to_string(),
            issued_at: now,
            expires_at: now + chrono::Duration::days(7),
            revoked: false,
        })
        .await
        .unwrap();

        assert!(db.revoke_token("j1").await.unwrap());
        assert!(db.revoke_token("j1").await.unwrap());
        assert!(!db.revoke_token("missing").await.unwrap());
        assert!(db.get_token("j1").await.unwrap().unwrap().revoked);
    }
}
