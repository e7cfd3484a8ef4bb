// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Collection CRUD with field validation and ownership checks.

use std::sync::Arc;

use crate::db::store::collection_not_found;
use crate::db::{AccountStore, CollectionStore};
use crate::error::AppError;
use crate::models::collection::{is_valid_collection_id, is_valid_collection_name};
use crate::models::ids::new_object_id;
use crate::models::{Collection, CollectionRef};

pub struct CollectionsService {
    accounts: Arc<dyn AccountStore>,
    collections: Arc<dyn CollectionStore>,
}

impl CollectionsService {
    pub fn new(accounts: Arc<dyn AccountStore>, collections: Arc<dyn CollectionStore>) -> Self {
        Self {
            accounts,
            collections,
        }
    }

    /// The caller's collection references, in creation order.
    pub async fn list(&self, user_id: &str) -> Result<Vec<CollectionRef>, AppError> {
        let account = self
            .accounts
            .get_account(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        Ok(account.collections)
    }

    /// Full collection with cards. Collections of other users look absent.
    pub async fn get(&self, user_id: &str, collection_id: &str) -> Result<Collection, AppError> {
        validate_id(collection_id)?;
        owned_collection(self.collections.as_ref(), user_id, collection_id).await
    }

    pub async fn create(&self, user_id: &str, name: &str) -> Result<CollectionRef, AppError> {
        validate_name(name)?;

        let collection = Collection::new(new_object_id()?, user_id.to_string(), name.to_string());
        self.collections.create_collection(&collection).await?;

        Ok(CollectionRef {
            id: collection.id,
            name: collection.name,
        })
    }

    pub async fn rename(
        &self,
        user_id: &str,
        collection_id: &str,
        name: &str,
    ) -> Result<CollectionRef, AppError> {
        validate_id(collection_id)?;
        validate_name(name)?;

        let renamed = self
            .collections
            .rename_collection(user_id, collection_id, name)
            .await?;
        tracing::info!(user_id, collection_id, "Collection renamed");
        Ok(renamed)
    }

    pub async fn delete(&self, user_id: &str, collection_id: &str) -> Result<(), AppError> {
        validate_id(collection_id)?;
        self.collections
            .delete_collection(user_id, collection_id)
            .await
    }
}

pub(crate) fn validate_id(collection_id: &str) -> Result<(), AppError> {
    if is_valid_collection_id(collection_id) {
        Ok(())
    } else {
        Err(AppError::BadRequest("Invalid collection id".to_string()))
    }
}

fn validate_name(name: &str) -> Result<(), AppError> {
    if is_valid_collection_name(name) {
        Ok(())
    } else {
        Err(AppError::BadRequest(
            "Collection name must be 1-20 characters".to_string(),
        ))
    }
}

/// Load a collection and check it belongs to `user_id`.
pub(crate) async fn owned_collection(
    store: &dyn CollectionStore,
    user_id: &str,
    collection_id: &str,
) -> Result<Collection, AppError> {
    match store.get_collection(collection_id).await? {
        Some(collection) if collection.user_id == user_id => Ok(collection),
        Some(_) => {
            tracing::warn!(user_id, collection_id, "Access to another user's collection");
            Err(collection_not_found())
        }
        None => Err(collection_not_found()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryDb;
    use crate::models::Account;

    const ALICE: &str = "64a9b66b2db8b91234a6e8a1";
    const BOB: &str = "64a9b66b2db8b91234a6e8b2";

    async fn setup() -> (MemoryDb, CollectionsService) {
        let db = MemoryDb::new();
        for (id, email) in [(ALICE, "alice@example.com"), (BOB, "bob@example.com")] {
            db.create_account(&Account::with_email(
                id.to_string(),
                email.to_string(),
                "hash".to_string(),
                "Name".to_string(),
                String::new(),
            ))
            .await
            .unwrap();
        }
        let store = Arc::new(db.clone());
        (db, CollectionsService::new(store.clone(), store))
    }

    #[tokio::test]
    async fn test_create_list_rename_delete() {
        let (db, svc) = setup().await;

        let created = svc.create(ALICE, "Modern").await.unwrap();
        assert_eq!(svc.list(ALICE).await.unwrap(), vec![created.clone()]);

        let renamed = svc.rename(ALICE, &created.id, "Legacy").await.unwrap();
        assert_eq!(renamed.name, "Legacy");
        assert_eq!(svc.list(ALICE).await.unwrap()[0].name, "Legacy");
        assert_eq!(svc.get(ALICE, &created.id).await.unwrap().name, "Legacy");

        svc.delete(ALICE, &created.id).await.unwrap();
        assert!(svc.list(ALICE).await.unwrap().is_empty());
        assert_eq!(db.collection_count().await, 0);
    }

    #[tokio::test]
    async fn test_other_users_collection_is_not_found() {
        let (_db, svc) = setup().await;
        let created = svc.create(ALICE, "Modern").await.unwrap();

        assert!(matches!(
            svc.get(BOB, &created.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            svc.rename(BOB, &created.id, "Mine").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            svc.delete(BOB, &created.id).await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(svc.get(ALICE, &created.id).await.unwrap().name, "Modern");
    }

    #[tokio::test]
    async fn test_validation_happens_first() {
        let (db, svc) = setup().await;

        assert!(matches!(
            svc.create(ALICE, "").await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            svc.create(ALICE, &"x".repeat(21)).await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            svc.get(ALICE, "not-an-id").await,
            Err(AppError::BadRequest(_))
        ));
        assert_eq!(db.collection_count().await, 0);
    }
}
