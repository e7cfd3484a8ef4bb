// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Collection routes for authenticated users.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{Collection, CollectionRef};
use crate::routes::extract::ValidatedJson;
use crate::AppState;

/// Collection routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/collections", get(list_collections).post(create_collection))
        .route(
            "/collections/{id}",
            get(get_collection)
                .patch(rename_collection)
                .delete(delete_collection),
        )
}

/// Name checks (length, single line) happen in the service.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CollectionNameRequest {
    pub name: String,
}

async fn list_collections(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<CollectionRef>>> {
    let refs = state.collections_service.list(&user.user_id).await?;
    Ok(Json(refs))
}

async fn get_collection(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Collection>> {
    let collection = state.collections_service.get(&user.user_id, &id).await?;
    Ok(Json(collection))
}

async fn create_collection(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(req): ValidatedJson<CollectionNameRequest>,
) -> Result<(StatusCode, Json<CollectionRef>)> {
    let created = state
        .collections_service
        .create(&user.user_id, &req.name)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn rename_collection(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<CollectionNameRequest>,
) -> Result<Json<CollectionRef>> {
    let renamed = state
        .collections_service
        .rename(&user.user_id, &id, &req.name)
        .await?;
    Ok(Json(renamed))
}

async fn delete_collection(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.collections_service.delete(&user.user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
