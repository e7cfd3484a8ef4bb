// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod auth;
pub mod cards;
pub mod collections;
pub mod password;
pub mod token;

pub use auth::{AuthService, NewEmailAccount, NewTelegramAccount};
pub use cards::{CardsService, NewCard};
pub use collections::CollectionsService;
pub use token::{Claims, TokenPair, TokenService};
