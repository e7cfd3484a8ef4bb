// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Card routes, nested under a collection.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::Card;
use crate::routes::extract::ValidatedJson;
use crate::services::NewCard;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/collections/{id}/cards", get(list_cards).post(add_card))
        .route(
            "/collections/{id}/cards/{card_id}",
            patch(set_card_count).delete(delete_card),
        )
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct AddCardRequest {
    #[validate(length(min = 1))]
    pub scryfall_id: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub card_url: String,
    #[validate(range(min = 1))]
    pub count: u32,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SetCardCountRequest {
    pub count: u32,
}

async fn list_cards(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Card>>> {
    let cards = state.cards_service.list(&user.user_id, &id).await?;
    Ok(Json(cards))
}

async fn add_card(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<AddCardRequest>,
) -> Result<StatusCode> {
    state
        .cards_service
        .add(
            &user.user_id,
            &id,
            NewCard {
                scryfall_id: req.scryfall_id,
                name: req.name,
                card_url: req.card_url,
                count: req.count,
            },
        )
        .await?;
    Ok(StatusCode::CREATED)
}

async fn set_card_count(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path((id, card_id)): Path<(String, String)>,
    ValidatedJson(req): ValidatedJson<SetCardCountRequest>,
) -> Result<StatusCode> {
    state
        .cards_service
        .set_count(&user.user_id, &id, &card_id, req.count)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_card(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path((id, card_id)): Path<(String, String)>,
) -> Result<StatusCode> {
    state
        .cards_service
        .delete(&user.user_id, &id, &card_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
