// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registration, login, and refresh-token session management.

use std::sync::Arc;

use crate::db::{AccountStore, TokenStore};
use crate::error::AppError;
use crate::models::ids::new_object_id;
use crate::models::Account;
use crate::services::password::{hash_password, verify_password};
use crate::services::token::{TokenPair, TokenService};

/// Email/password registration input.
#[derive(Debug, Clone)]
pub struct NewEmailAccount {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Telegram registration input.
#[derive(Debug, Clone)]
pub struct NewTelegramAccount {
    pub telegram_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: Option<String>,
}

/// Orchestrates account creation and the token session lifecycle.
pub struct AuthService {
    accounts: Arc<dyn AccountStore>,
    sessions: Arc<dyn TokenStore>,
    tokens: TokenService,
    bcrypt_cost: u32,
    reject_revoked_refresh_tokens: bool,
}

impl AuthService {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        sessions: Arc<dyn TokenStore>,
        tokens: TokenService,
        bcrypt_cost: u32,
        reject_revoked_refresh_tokens: bool,
    ) -> Self {
        Self {
            accounts,
            sessions,
            tokens,
            bcrypt_cost,
            reject_revoked_refresh_tokens,
        }
    }

    pub async fn register(&self, input: NewEmailAccount) -> Result<TokenPair, AppError> {
        if input.email.trim().is_empty() || input.password.is_empty() {
            tracing::warn!("Registration rejected: missing email or password");
            return Err(AppError::BadRequest(
                "Invalid email or password".to_string(),
            ));
        }
        if input.first_name.trim().is_empty() {
            tracing::warn!("Registration rejected: missing first name");
            return Err(AppError::BadRequest("Invalid user's data".to_string()));
        }

        // Skip the hashing cost for an identity that is already taken.
        if self
            .accounts
            .find_account_by_email(&input.email)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        let password_hash = hash_password(&input.password, self.bcrypt_cost).await?;
        let account = Account::with_email(
            new_object_id()?,
            input.email,
            password_hash,
            input.first_name,
            input.last_name,
        );
        self.accounts.create_account(&account).await?;

        tracing::info!(user_id = %account.id, "Registered email account");
        self.start_session(&account.id).await
    }

    pub async fn register_telegram(
        &self,
        input: NewTelegramAccount,
    ) -> Result<TokenPair, AppError> {
        if input.telegram_id == 0 {
            tracing::warn!("Telegram registration rejected: missing telegram_id");
            return Err(AppError::BadRequest("Invalid telegram_id".to_string()));
        }
        if input.first_name.trim().is_empty() {
            return Err(AppError::BadRequest("Invalid user's data".to_string()));
        }

        let account = Account::with_telegram(
            new_object_id()?,
            input.telegram_id,
            input.first_name,
            input.last_name,
            input.username.filter(|u| !u.is_empty()),
        );
        self.accounts.create_account(&account).await?;

        tracing::info!(
            user_id = %account.id,
            telegram_id = input.telegram_id,
            "Registered Telegram account"
        );
        self.start_session(&account.id).await
    }

    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AppError> {
        let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

        let account = match self.accounts.find_account_by_email(email).await? {
            Some(account) => account,
            None => {
                tracing::warn!("Login failed: unknown email");
                return Err(invalid());
            }
        };

        let Some(hash) = account.password_hash.as_deref() else {
            return Err(invalid());
        };
        if !verify_password(password, hash).await? {
            tracing::warn!(user_id = %account.id, "Login failed: password mismatch");
            return Err(invalid());
        }

        tracing::info!(user_id = %account.id, "User logged in");
        self.start_session(&account.id).await
    }

    /// Rotate a refresh token: issue a new pair, then revoke the old session.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        let claims = self.tokens.decode_refresh(refresh_token)?;

        if self.reject_revoked_refresh_tokens {
            match self.sessions.get_token(&claims.jti).await? {
                Some(record) if !record.revoked => {}
                _ => {
                    tracing::warn!(user_id = %claims.sub, jti = %claims.jti, "Refresh with revoked session");
                    return Err(AppError::InvalidToken);
                }
            }
        }

        let account = self
            .accounts
            .get_account(&claims.sub)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let pair = self.start_session(&account.id).await?;
        self.sessions.revoke_token(&claims.jti).await?;

        tracing::info!(
            user_id = %account.id,
            old_jti = %claims.jti,
            new_jti = %pair.jti,
            "Refresh token rotated"
        );
        Ok(pair)
    }

    /// Revoke the session behind a refresh token. Unknown or already
    /// revoked sessions are not an error.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AppError> {
        let claims = self.tokens.decode_refresh(refresh_token)?;

        if self.sessions.revoke_token(&claims.jti).await? {
            tracing::info!(user_id = %claims.sub, jti = %claims.jti, "Session revoked");
        } else {
            tracing::debug!(jti = %claims.jti, "Logout for unknown session");
        }
        Ok(())
    }

    async fn start_session(&self, user_id: &str) -> Result<TokenPair, AppError> {
        let pair = self.tokens.issue_pair(user_id)?;
        self.sessions.add_token(&pair.record()).await?;
        Ok(pair)
    }
}
