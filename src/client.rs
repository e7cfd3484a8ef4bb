// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Typed HTTP client for the card-collector API.
//!
//! Covers every auth, collection and card endpoint. Bot front ends use it
//! to act on behalf of a Telegram user with the tokens they obtained from
//! `/telegram/register`.

use axum_extra::extract::cookie::Cookie;
use reqwest::header::SET_COOKIE;
use serde::Deserialize;
use thiserror::Error;

use crate::models::{Card, Collection, CollectionRef};
use crate::routes::auth::{
    AuthResponse, LoginRequest, MessageResponse, RefreshRequest, RegisterRequest,
    TelegramAuthResponse, TelegramRegisterRequest,
};
use crate::routes::cards::{AddCardRequest, SetCardCountRequest};
use crate::routes::collections::CollectionNameRequest;
use crate::routes::HealthResponse;

/// Client-side failure.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status. `message` is the server's error message when the
    /// body was the usual `{message, status}` shape, else the raw body.
    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Response is missing the refresh_token cookie")]
    MissingRefreshCookie,
}

impl ClientError {
    /// HTTP status of an API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Tokens from an email login, register or refresh. The refresh token is
/// read from the `refresh_token` cookie.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Card-collector API client.
#[derive(Clone)]
pub struct CollectorClient {
    http: reqwest::Client,
    base_url: String,
}

impl CollectorClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(reqwest::Client::new(), base_url)
    }

    pub fn with_http_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        let response = self.http.get(self.url("/health")).send().await?;
        check_response_json(response).await
    }

    // ─── Auth ────────────────────────────────────────────────

    pub async fn register(&self, request: &RegisterRequest) -> Result<Session> {
        let response = self
            .http
            .post(self.url("/register"))
            .json(request)
            .send()
            .await?;
        session_from(response).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .http
            .post(self.url("/login"))
            .json(&request)
            .send()
            .await?;
        session_from(response).await
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<Session> {
        let response = self
            .http
            .post(self.url("/refresh"))
            .json(&refresh_body(refresh_token))
            .send()
            .await?;
        session_from(response).await
    }

    pub async fn logout(&self, refresh_token: &str) -> Result<()> {
        let response = self
            .http
            .post(self.url("/logout"))
            .json(&refresh_body(refresh_token))
            .send()
            .await?;
        let _: MessageResponse = check_response_json(response).await?;
        Ok(())
    }

    pub async fn register_telegram(
        &self,
        request: &TelegramRegisterRequest,
    ) -> Result<TelegramAuthResponse> {
        tracing::info!(
            telegram_id = request.telegram_id,
            "Registering Telegram user"
        );
        let response = self
            .http
            .post(self.url("/telegram/register"))
            .json(request)
            .send()
            .await?;
        check_response_json(response).await
    }

    // ─── Collections ─────────────────────────────────────────

    pub async fn list_collections(&self, access_token: &str) -> Result<Vec<CollectionRef>> {
        let response = self
            .http
            .get(self.url("/collections"))
            .bearer_auth(access_token)
            .send()
            .await?;
        check_response_json(response).await
    }

    /// Look up a collection reference by its exact name.
    pub async fn find_collection_by_name(
        &self,
        access_token: &str,
        name: &str,
    ) -> Result<Option<CollectionRef>> {
        let collections = self.list_collections(access_token).await?;
        Ok(collections.into_iter().find(|c| c.name == name))
    }

    pub async fn get_collection(&self, access_token: &str, id: &str) -> Result<Collection> {
        let response = self
            .http
            .get(self.url(&format!("/collections/{}", id)))
            .bearer_auth(access_token)
            .send()
            .await?;
        check_response_json(response).await
    }

    pub async fn create_collection(
        &self,
        access_token: &str,
        name: &str,
    ) -> Result<CollectionRef> {
        let response = self
            .http
            .post(self.url("/collections"))
            .bearer_auth(access_token)
            .json(&CollectionNameRequest {
                name: name.to_string(),
            })
            .send()
            .await?;
        check_response_json(response).await
    }

    pub async fn rename_collection(
        &self,
        access_token: &str,
        id: &str,
        name: &str,
    ) -> Result<CollectionRef> {
        let response = self
            .http
            .patch(self.url(&format!("/collections/{}", id)))
            .bearer_auth(access_token)
            .json(&CollectionNameRequest {
                name: name.to_string(),
            })
            .send()
            .await?;
        check_response_json(response).await
    }

    pub async fn delete_collection(&self, access_token: &str, id: &str) -> Result<()> {
        let response = self
            .http
            .delete(self.url(&format!("/collections/{}", id)))
            .bearer_auth(access_token)
            .send()
            .await?;
        check_response(response).await
    }

    // ─── Cards ───────────────────────────────────────────────

    pub async fn list_cards(&self, access_token: &str, collection_id: &str) -> Result<Vec<Card>> {
        let response = self
            .http
            .get(self.url(&format!("/collections/{}/cards", collection_id)))
            .bearer_auth(access_token)
            .send()
            .await?;
        check_response_json(response).await
    }

    pub async fn add_card(
        &self,
        access_token: &str,
        collection_id: &str,
        card: &AddCardRequest,
    ) -> Result<()> {
        let response = self
            .http
            .post(self.url(&format!("/collections/{}/cards", collection_id)))
            .bearer_auth(access_token)
            .json(card)
            .send()
            .await?;
        check_response(response).await
    }

    pub async fn set_card_count(
        &self,
        access_token: &str,
        collection_id: &str,
        scryfall_id: &str,
        count: u32,
    ) -> Result<()> {
        let response = self
            .http
            .patch(self.url(&format!(
                "/collections/{}/cards/{}",
                collection_id, scryfall_id
            )))
            .bearer_auth(access_token)
            .json(&SetCardCountRequest { count })
            .send()
            .await?;
        check_response(response).await
    }

    pub async fn delete_card(
        &self,
        access_token: &str,
        collection_id: &str,
        scryfall_id: &str,
    ) -> Result<()> {
        let response = self
            .http
            .delete(self.url(&format!(
                "/collections/{}/cards/{}",
                collection_id, scryfall_id
            )))
            .bearer_auth(access_token)
            .send()
            .await?;
        check_response(response).await
    }
}

fn refresh_body(refresh_token: &str) -> RefreshRequest {
    RefreshRequest {
        refresh_token: Some(refresh_token.to_string()),
    }
}

async fn session_from(response: reqwest::Response) -> Result<Session> {
    let refresh_token = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| Cookie::parse(value).ok())
        .find(|cookie| cookie.name() == "refresh_token" && !cookie.value().is_empty())
        .map(|cookie| cookie.value().to_string());

    let body: AuthResponse = check_response_json(response).await?;
    Ok(Session {
        access_token: body.access_token,
        refresh_token: refresh_token.ok_or(ClientError::MissingRefreshCookie)?,
        expires_in: body.expires_at,
    })
}

/// Map a non-success response to `ClientError::Api`.
async fn api_error(response: reqwest::Response) -> ClientError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|e| e.message)
        .unwrap_or(body);

    tracing::warn!(status, message = %message, "Collector API request failed");
    ClientError::Api { status, message }
}

async fn check_response(response: reqwest::Response) -> Result<()> {
    if response.status().is_success() {
        return Ok(());
    }
    Err(api_error(response).await)
}

async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T> {
    if !response.status().is_success() {
        return Err(api_error(response).await);
    }
    Ok(response.json().await?)
}
