// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT issuance and validation.
//!
//! Access and refresh tokens are HS256-signed and share one `jti` per
//! session. A refresh token is marked with `type = "refresh"`; an access
//! token has no `type` claim.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::TokenRecord;

/// Access token lifetime (15 minutes).
pub const ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;
/// Refresh token lifetime (7 days).
pub const REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

const REFRESH_TOKEN_TYPE: &str = "refresh";

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (account ID)
    pub sub: String,
    /// Session ID, shared by an access/refresh pair
    pub jti: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl Claims {
    pub fn is_refresh(&self) -> bool {
        self.token_type.as_deref() == Some(REFRESH_TOKEN_TYPE)
    }
}

/// A freshly minted access/refresh pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub jti: String,
    pub user_id: String,
    pub issued_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

impl TokenPair {
    /// Session record to persist for this pair.
    pub fn record(&self) -> TokenRecord {
        TokenRecord {
            jti: self.jti.clone(),
            user_id: self.user_id.clone(),
            issued_at: self.issued_at,
            expires_at: self.refresh_expires_at,
            revoked: false,
        }
    }
}

/// Signs and verifies session tokens with a single shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issue a new access + refresh pair under a fresh `jti`.
    pub fn issue_pair(&self, user_id: &str) -> Result<TokenPair, AppError> {
        let jti = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        let iat = now.timestamp();

        let access = Claims {
            sub: user_id.to_string(),
            jti: jti.clone(),
            iat,
            exp: iat + ACCESS_TOKEN_TTL_SECS,
            token_type: None,
        };
        let refresh = Claims {
            exp: iat + REFRESH_TOKEN_TTL_SECS,
            token_type: Some(REFRESH_TOKEN_TYPE.to_string()),
            ..access.clone()
        };

        Ok(TokenPair {
            access_token: self.sign(&access)?,
            refresh_token: self.sign(&refresh)?,
            jti,
            user_id: user_id.to_string(),
            issued_at: now,
            refresh_expires_at: now + Duration::seconds(REFRESH_TOKEN_TTL_SECS),
        })
    }

    /// Validate a bearer token. Refresh tokens are rejected.
    pub fn decode_access(&self, token: &str) -> Result<Claims, AppError> {
        let claims = self.decode(token)?;
        if claims.is_refresh() {
            return Err(AppError::InvalidToken);
        }
        Ok(claims)
    }

    /// Validate a refresh token. Access tokens are rejected.
    pub fn decode_refresh(&self, token: &str) -> Result<Claims, AppError> {
        let claims = self.decode(token)?;
        if !claims.is_refresh() || claims.jti.is_empty() {
            return Err(AppError::InvalidToken);
        }
        Ok(claims)
    }

    fn decode(&self, token: &str) -> Result<Claims, AppError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| AppError::InvalidToken)?;
        if data.claims.sub.is_empty() {
            return Err(AppError::InvalidToken);
        }
        Ok(data.claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(e.into()))
    }
}
