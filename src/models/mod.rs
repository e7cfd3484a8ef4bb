// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod account;
pub mod collection;
pub mod ids;
pub mod token;

pub use account::{Account, CollectionRef};
pub use collection::{Card, CardAddition, Collection};
pub use token::TokenRecord;
