// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Card-Collector: per-user trading card collections
//!
//! This crate provides the backend API for account registration (email or
//! Telegram), JWT sessions, and CRUD over collections and their cards.

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use config::Config;
use db::Store;
use services::{AuthService, CardsService, CollectionsService, TokenService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub tokens: TokenService,
    pub auth_service: AuthService,
    pub collections_service: CollectionsService,
    pub cards_service: CardsService,
}

impl AppState {
    /// Wire every service to one storage backend.
    pub fn new<S: Store + 'static>(config: Config, store: Arc<S>) -> Self {
        let tokens = TokenService::new(&config.jwt_secret);

        let auth_service = AuthService::new(
            store.clone(),
            store.clone(),
            tokens.clone(),
            config.bcrypt_cost,
            config.reject_revoked_refresh_tokens,
        );
        let collections_service = CollectionsService::new(store.clone(), store.clone());
        let cards_service = CardsService::new(store);

        Self {
            config,
            tokens,
            auth_service,
            collections_service,
            cards_service,
        }
    }
}
