// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{header, Request, Response},
};
use card_collector::config::Config;
use card_collector::db::{FirestoreDb, MemoryDb};
use card_collector::routes::create_router;
use card_collector::AppState;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a test app backed by an in-memory store.
/// Returns the router, the shared state and the store.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, MemoryDb) {
    create_test_app_with(Config::default())
}

#[allow(dead_code)]
pub fn create_test_app_with(config: Config) -> (axum::Router, Arc<AppState>, MemoryDb) {
    let db = MemoryDb::new();
    let state = Arc::new(AppState::new(config, Arc::new(db.clone())));
    (create_router(state.clone()), state, db)
}

/// Build a request with an optional bearer token and JSON body.
#[allow(dead_code)]
pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

#[allow(dead_code)]
pub async fn send(app: &axum::Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

/// Read a response body as JSON (`Value::Null` when empty).
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    }
}

/// Value of the `refresh_token` cookie set by a response, if any.
#[allow(dead_code)]
pub fn refresh_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|v| {
            v.strip_prefix("refresh_token=")
                .map(|rest| rest.split(';').next().unwrap_or_default().to_string())
        })
}

/// Tokens from a successful registration.
#[allow(dead_code)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
}

/// Register an email account and return its session.
#[allow(dead_code)]
pub async fn register(app: &axum::Router, email: &str) -> Session {
    let response = send(
        app,
        json_request(
            "POST",
            "/register",
            None,
            Some(serde_json::json!({
                "email": email,
                "password": "secret1",
                "first_name": "Test",
            })),
        ),
    )
    .await;
    assert_eq!(response.status(), 201, "registration failed");

    let refresh_token = refresh_cookie(&response).expect("refresh cookie");
    let body = body_json(response).await;
    Session {
        access_token: body["access_token"].as_str().unwrap().to_string(),
        refresh_token,
    }
}

/// Create a collection for the session's user and return its ID.
#[allow(dead_code)]
pub async fn create_collection(app: &axum::Router, token: &str, name: &str) -> String {
    let response = send(
        app,
        json_request(
            "POST",
            "/collections",
            Some(token),
            Some(serde_json::json!({ "name": name })),
        ),
    )
    .await;
    assert_eq!(response.status(), 201, "collection creation failed");
    body_json(response).await["id"]
        .as_str()
        .unwrap()
        .to_string()
}

/// Serve a fresh in-memory app on an ephemeral local port.
/// Returns the base URL and the store.
#[allow(dead_code)]
pub async fn spawn_test_server() -> (String, MemoryDb) {
    let (app, _, db) = create_test_app();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), db)
}
