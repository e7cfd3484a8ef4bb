// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Refresh-token session record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One issued refresh-token session (`tokens` collection, keyed by `jti`).
///
/// Records are never deleted; `revoked` only ever goes from false to true.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    pub jti: String,
    /// Account ID the session belongs to
    pub user_id: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub revoked: bool,
}
