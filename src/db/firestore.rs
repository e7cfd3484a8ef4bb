// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Accounts (profile, credentials, collection references)
//! - Collections (with embedded cards)
//! - Tokens (refresh-token sessions)

use async_trait::async_trait;
use firestore::errors::{BackoffError, FirestoreError};
use firestore::FirestoreTransaction;
use serde::{Deserialize, Serialize};

use crate::db::collections;
use crate::db::store::{
    account_not_found, card_not_found, collection_not_found, AccountStore, CollectionStore,
    TokenStore,
};
use crate::error::AppError;
use crate::models::{Account, Card, CardAddition, Collection, CollectionRef, TokenRecord};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: firestore::FirestoreDb,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }
}

// ─── Transaction helpers ─────────────────────────────────────
//
// Read-modify-write operations run under `run_transaction`. Reads go through
// the transaction-bound client so Firestore aborts the commit when another
// writer touched the same documents, and the closure is retried on fresh data.

type TxResult<T> = Result<T, BackoffError<AppError>>;

/// Lock contention and aborted commits are retried; anything else fails the
/// transaction.
fn backoff(e: FirestoreError) -> BackoffError<AppError> {
    let retry = matches!(&e, FirestoreError::DatabaseError(db_err) if db_err.retry_possible);
    let err = AppError::Database(e.to_string());
    if retry {
        BackoffError::transient(err)
    } else {
        BackoffError::permanent(err)
    }
}

/// Recover the `AppError` a transaction body failed with.
fn transaction_error(e: FirestoreError) -> AppError {
    match e {
        FirestoreError::ErrorInTransaction(inner) => match inner.source.downcast::<AppError>() {
            Ok(err) => *err,
            Err(source) => AppError::Database(source.to_string()),
        },
        other => AppError::Database(format!("Transaction failed: {}", other)),
    }
}

async fn tx_read<T>(db: &firestore::FirestoreDb, collection: &str, id: &str) -> TxResult<Option<T>>
where
    T: Send,
    for<'de> T: Deserialize<'de>,
{
    db.fluent()
        .select()
        .by_id_in(collection)
        .obj()
        .one(id)
        .await
        .map_err(backoff)
}

fn tx_write<T>(
    db: &firestore::FirestoreDb,
    transaction: &mut FirestoreTransaction<'_>,
    collection: &str,
    id: &str,
    object: &T,
) -> TxResult<()>
where
    T: Serialize + Sync + Send,
    for<'de> T: Deserialize<'de>,
{
    db.fluent()
        .update()
        .in_col(collection)
        .document_id(id)
        .object(object)
        .add_to_transaction(transaction)
        .map_err(backoff)?;
    Ok(())
}

fn tx_delete(
    db: &firestore::FirestoreDb,
    transaction: &mut FirestoreTransaction<'_>,
    collection: &str,
    id: &str,
) -> TxResult<()> {
    db.fluent()
        .delete()
        .from(collection)
        .document_id(id)
        .add_to_transaction(transaction)
        .map_err(backoff)?;
    Ok(())
}

async fn tx_account(db: &firestore::FirestoreDb, id: &str) -> TxResult<Account> {
    tx_read(db, collections::ACCOUNTS, id)
        .await?
        .ok_or_else(|| BackoffError::permanent(account_not_found()))
}

async fn tx_collection(db: &firestore::FirestoreDb, id: &str) -> TxResult<Collection> {
    tx_read(db, collections::COLLECTIONS, id)
        .await?
        .ok_or_else(|| BackoffError::permanent(collection_not_found()))
}

// ─── Account Operations ──────────────────────────────────────

#[async_trait]
impl AccountStore for FirestoreDb {
    /// Uniqueness is checked by query before the write; two concurrent
    /// registrations with the same identity can both pass the check.
    async fn create_account(&self, account: &Account) -> Result<(), AppError> {
        if let Some(email) = &account.email {
            if self.find_account_by_email(email).await?.is_some() {
                return Err(AppError::Conflict("User already exists".to_string()));
            }
        }
        if let Some(telegram_id) = account.telegram_id {
            if self.find_account_by_telegram_id(telegram_id).await?.is_some() {
                return Err(AppError::Conflict("User already exists".to_string()));
            }
        }

        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::ACCOUNTS)
            .document_id(&account.id)
            .object(account)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(user_id = %account.id, "Account created");
        Ok(())
    }

    async fn get_account(&self, id: &str) -> Result<Option<Account>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::ACCOUNTS)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        let email = email.to_string();
        let accounts: Vec<Account> = self
            .client
            .fluent()
            .select()
            .from(collections::ACCOUNTS)
            .filter(move |q| q.for_all([q.field("email").eq(email.clone())]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(accounts.into_iter().next())
    }

    async fn find_account_by_telegram_id(
        &self,
        telegram_id: i64,
    ) -> Result<Option<Account>, AppError> {
        let accounts: Vec<Account> = self
            .client
            .fluent()
            .select()
            .from(collections::ACCOUNTS)
            .filter(move |q| q.for_all([q.field("telegram_id").eq(telegram_id)]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(accounts.into_iter().next())
    }
}

// ─── Collection Operations ───────────────────────────────────

#[async_trait]
impl CollectionStore for FirestoreDb {
    async fn get_collection(&self, id: &str) -> Result<Option<Collection>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::COLLECTIONS)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn create_collection(&self, collection: &Collection) -> Result<(), AppError> {
        let staged = collection.clone();
        self.client
            .run_transaction(move |db, transaction| {
                let collection = staged.clone();
                Box::pin(async move {
                    let mut owner = tx_account(&db, &collection.user_id).await?;
                    owner.push_collection_ref(&collection.id, &collection.name);

                    tx_write(&db, transaction, collections::ACCOUNTS, &owner.id, &owner)?;
                    tx_write(
                        &db,
                        transaction,
                        collections::COLLECTIONS,
                        &collection.id,
                        &collection,
                    )?;
                    Ok::<_, BackoffError<AppError>>(())
                })
            })
            .await
            .map_err(transaction_error)?;

        tracing::info!(
            user_id = %collection.user_id,
            collection_id = %collection.id,
            "Collection created"
        );
        Ok(())
    }

    async fn rename_collection(
        &self,
        user_id: &str,
        collection_id: &str,
        name: &str,
    ) -> Result<CollectionRef, AppError> {
        let (user_id, collection_id, name) =
            (user_id.to_string(), collection_id.to_string(), name.to_string());

        self.client
            .run_transaction(move |db, transaction| {
                let (user_id, collection_id, name) =
                    (user_id.clone(), collection_id.clone(), name.clone());
                Box::pin(async move {
                    let mut owner = tx_account(&db, &user_id).await?;
                    if !owner.rename_collection_ref(&collection_id, &name) {
                        return Err(BackoffError::permanent(collection_not_found()));
                    }
                    let mut collection = tx_collection(&db, &collection_id).await?;
                    collection.rename(&name);

                    tx_write(&db, transaction, collections::ACCOUNTS, &owner.id, &owner)?;
                    tx_write(
                        &db,
                        transaction,
                        collections::COLLECTIONS,
                        &collection_id,
                        &collection,
                    )?;
                    Ok::<_, BackoffError<AppError>>(CollectionRef {
                        id: collection.id,
                        name: collection.name,
                    })
                })
            })
            .await
            .map_err(transaction_error)
    }

    async fn delete_collection(&self, user_id: &str, collection_id: &str) -> Result<(), AppError> {
        let (owner_id, target_id) = (user_id.to_string(), collection_id.to_string());

        self.client
            .run_transaction(move |db, transaction| {
                let (owner_id, target_id) = (owner_id.clone(), target_id.clone());
                Box::pin(async move {
                    let mut owner = tx_account(&db, &owner_id).await?;
                    if !owner.remove_collection_ref(&target_id) {
                        return Err(BackoffError::permanent(collection_not_found()));
                    }

                    tx_write(&db, transaction, collections::ACCOUNTS, &owner.id, &owner)?;
                    tx_delete(&db, transaction, collections::COLLECTIONS, &target_id)?;
                    Ok::<_, BackoffError<AppError>>(())
                })
            })
            .await
            .map_err(transaction_error)?;

        tracing::info!(user_id, collection_id, "Collection deleted");
        Ok(())
    }

    async fn add_card(&self, collection_id: &str, card: &Card) -> Result<CardAddition, AppError> {
        let (collection_id, card) = (collection_id.to_string(), card.clone());

        self.client
            .run_transaction(move |db, transaction| {
                let (collection_id, card) = (collection_id.clone(), card.clone());
                Box::pin(async move {
                    let mut collection = tx_collection(&db, &collection_id).await?;
                    let outcome = collection.add_card(card);
                    tx_write(
                        &db,
                        transaction,
                        collections::COLLECTIONS,
                        &collection_id,
                        &collection,
                    )?;
                    Ok::<_, BackoffError<AppError>>(outcome)
                })
            })
            .await
            .map_err(transaction_error)
    }

    async fn set_card_count(
        &self,
        collection_id: &str,
        scryfall_id: &str,
        count: u32,
    ) -> Result<(), AppError> {
        let (collection_id, scryfall_id) = (collection_id.to_string(), scryfall_id.to_string());

        self.client
            .run_transaction(move |db, transaction| {
                let (collection_id, scryfall_id) = (collection_id.clone(), scryfall_id.clone());
                Box::pin(async move {
                    let mut collection = tx_collection(&db, &collection_id).await?;
                    if !collection.set_card_count(&scryfall_id, count) {
                        return Err(BackoffError::permanent(card_not_found()));
                    }
                    tx_write(
                        &db,
                        transaction,
                        collections::COLLECTIONS,
                        &collection_id,
                        &collection,
                    )?;
                    Ok::<_, BackoffError<AppError>>(())
                })
            })
            .await
            .map_err(transaction_error)
    }

    async fn delete_card(
        &self,
        collection_id: &str,
        scryfall_id: &str,
    ) -> Result<bool, AppError> {
        let (collection_id, scryfall_id) = (collection_id.to_string(), scryfall_id.to_string());

        self.client
            .run_transaction(move |db, transaction| {
                let (collection_id, scryfall_id) = (collection_id.clone(), scryfall_id.clone());
                Box::pin(async move {
                    let mut collection = tx_collection(&db, &collection_id).await?;
                    if !collection.remove_card(&scryfall_id) {
                        return Ok(false);
                    }
                    tx_write(
                        &db,
                        transaction,
                        collections::COLLECTIONS,
                        &collection_id,
                        &collection,
                    )?;
                    Ok::<_, BackoffError<AppError>>(true)
                })
            })
            .await
            .map_err(transaction_error)
    }
}

// ─── Token Operations ────────────────────────────────────────

#[async_trait]
impl TokenStore for FirestoreDb {
    async fn add_token(&self, record: &TokenRecord) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::TOKENS)
            .document_id(&record.jti)
            .object(record)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn get_token(&self, jti: &str) -> Result<Option<TokenRecord>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::TOKENS)
            .obj()
            .one(jti)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn revoke_token(&self, jti: &str) -> Result<bool, AppError> {
        let jti = jti.to_string();

        self.client
            .run_transaction(move |db, transaction| {
                let jti = jti.clone();
                Box::pin(async move {
                    let Some(mut record) =
                        tx_read::<TokenRecord>(&db, collections::TOKENS, &jti).await?
                    else {
                        return Ok(false);
                    };
                    if !record.revoked {
                        record.revoked = true;
                        tx_write(&db, transaction, collections::TOKENS, &jti, &record)?;
                    }
                    Ok::<_, BackoffError<AppError>>(true)
                })
            })
            .await
            .map_err(transaction_error)
    }
}
