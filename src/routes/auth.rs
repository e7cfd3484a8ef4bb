// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registration, login, and session routes.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::routes::extract::ValidatedJson;
use crate::services::token::{ACCESS_TOKEN_TTL_SECS, REFRESH_TOKEN_TTL_SECS};
use crate::services::{NewEmailAccount, NewTelegramAccount, TokenPair};
use crate::AppState;

const REFRESH_COOKIE: &str = "refresh_token";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/telegram/register", post(register_telegram))
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    #[validate(length(min = 1))]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TelegramRegisterRequest {
    pub telegram_id: i64,
    #[validate(length(min = 1))]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// Access token plus its lifetime in seconds. The refresh token travels
/// in the `refresh_token` cookie.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub expires_at: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TelegramAuthResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>)> {
    let pair = state
        .auth_service
        .register(NewEmailAccount {
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
        })
        .await?;

    let (jar, body) = session_response(jar, pair);
    Ok((StatusCode::CREATED, jar, body))
}

async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    let pair = state.auth_service.login(&req.email, &req.password).await?;
    Ok(session_response(jar, pair))
}

async fn refresh(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    let token = presented_refresh_token(&jar, &body)?;
    let pair = state.auth_service.refresh(&token).await?;
    Ok(session_response(jar, pair))
}

async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, Json<MessageResponse>)> {
    let token = presented_refresh_token(&jar, &body)?;
    state.auth_service.logout(&token).await?;

    Ok((
        jar.add(removal_cookie()),
        Json(MessageResponse {
            message: "Logout successful".to_string(),
        }),
    ))
}

async fn register_telegram(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<TelegramRegisterRequest>,
) -> Result<(StatusCode, Json<TelegramAuthResponse>)> {
    let pair = state
        .auth_service
        .register_telegram(NewTelegramAccount {
            telegram_id: req.telegram_id,
            first_name: req.first_name,
            last_name: req.last_name,
            username: req.username,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TelegramAuthResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        }),
    ))
}

/// Refresh token from the JSON body, falling back to the cookie.
fn presented_refresh_token(jar: &CookieJar, body: &[u8]) -> Result<String> {
    let req: RefreshRequest = if body.iter().all(u8::is_ascii_whitespace) {
        RefreshRequest::default()
    } else {
        serde_json::from_slice(body).map_err(|e| AppError::BadRequest(e.to_string()))?
    };

    req.refresh_token
        .filter(|t| !t.is_empty())
        .or_else(|| jar.get(REFRESH_COOKIE).map(|c| c.value().to_string()))
        .ok_or_else(|| AppError::BadRequest("refresh_token is required".to_string()))
}

/// Expired, empty `refresh_token` cookie. Sent on every logout, whether or
/// not the request carried the cookie.
fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build((REFRESH_COOKIE, ""))
        .path("/")
        .http_only(true)
        .secure(true)
        .build();
    cookie.make_removal();
    cookie
}

fn session_response(jar: CookieJar, pair: TokenPair) -> (CookieJar, Json<AuthResponse>) {
    let cookie = Cookie::build((REFRESH_COOKIE, pair.refresh_token))
        .path("/")
        .http_only(true)
        .secure(true)
        .max_age(time::Duration::seconds(REFRESH_TOKEN_TTL_SECS));

    (
        jar.add(cookie),
        Json(AuthResponse {
            access_token: pair.access_token,
            expires_at: ACCESS_TOKEN_TTL_SECS,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_token_wins_over_cookie() {
        let jar = CookieJar::new().add(Cookie::new(REFRESH_COOKIE, "from-cookie"));
        let token = presented_refresh_token(&jar, br#"{"refresh_token":"from-body"}"#).unwrap();
        assert_eq!(token, "from-body");
    }

    #[test]
    fn test_cookie_fallback() {
        let jar = CookieJar::new().add(Cookie::new(REFRESH_COOKIE, "from-cookie"));
        assert_eq!(presented_refresh_token(&jar, b"").unwrap(), "from-cookie");
        assert_eq!(presented_refresh_token(&jar, b"{}").unwrap(), "from-cookie");
    }

    #[test]
    fn test_missing_token_is_bad_request() {
        let err = presented_refresh_token(&CookieJar::new(), b"{}").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_removal_cookie_expires_refresh_token() {
        let cookie = removal_cookie();
        assert_eq!(cookie.name(), REFRESH_COOKIE);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }
}
