// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Document identifiers.

use ring::rand::{SecureRandom, SystemRandom};

/// Generate a 24-character hex document ID.
///
/// Layout: 4-byte big-endian Unix seconds, then 8 random bytes, so IDs sort
/// roughly by creation time.
pub fn new_object_id() -> anyhow::Result<String> {
    let mut bytes = [0u8; 12];

    let secs = chrono::Utc::now().timestamp() as u32;
    bytes[..4].copy_from_slice(&secs.to_be_bytes());

    SystemRandom::new()
        .fill(&mut bytes[4..])
        .map_err(|_| anyhow::anyhow!("System RNG failure"))?;

    Ok(hex::encode(bytes))
}
