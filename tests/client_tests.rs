// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Typed client against a live in-memory server.

use card_collector::client::{ClientError, CollectorClient};
use card_collector::db::TokenStore;
use card_collector::routes::auth::{RegisterRequest, TelegramRegisterRequest};
use card_collector::routes::cards::AddCardRequest;

mod common;
use common::spawn_test_server;

fn registration(email: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        password: "secret1".to_string(),
        first_name: "Test".to_string(),
        last_name: String::new(),
    }
}

fn island(count: u32) -> AddCardRequest {
    AddCardRequest {
        scryfall_id: "X".to_string(),
        name: "Island".to_string(),
        card_url: "https://example.com/island.jpg".to_string(),
        count,
    }
}

#[tokio::test]
async fn test_health() {
    let (url, _) = spawn_test_server().await;
    let client = CollectorClient::new(url);

    assert_eq!(client.health().await.unwrap().status, "ok");
}

#[tokio::test]
async fn test_session_lifecycle() {
    let (url, db) = spawn_test_server().await;
    let client = CollectorClient::new(format!("{}/", url));

    let registered = client.register(&registration("client@example.com")).await.unwrap();
    assert!(!registered.access_token.is_empty());
    assert!(!registered.refresh_token.is_empty());
    assert_eq!(registered.expires_in, 900);

    let logged_in = client.login("client@example.com", "secret1").await.unwrap();
    let rotated = client.refresh(&logged_in.refresh_token).await.unwrap();
    assert_ne!(rotated.refresh_token, logged_in.refresh_token);

    client.logout(&rotated.refresh_token).await.unwrap();
    let claims = card_collector::services::TokenService::new(
        &card_collector::config::Config::default().jwt_secret,
    )
    .decode_refresh(&rotated.refresh_token)
    .unwrap();
    assert!(db.get_token(&claims.jti).await.unwrap().unwrap().revoked);
}

#[tokio::test]
async fn test_api_errors_carry_status_and_message() {
    let (url, _) = spawn_test_server().await;
    let client = CollectorClient::new(url);

    client.register(&registration("dup@example.com")).await.unwrap();
    let err = client
        .register(&registration("dup@example.com"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(409));
    assert!(matches!(err, ClientError::Api { ref message, .. } if message == "User already exists"));

    let err = client.login("dup@example.com", "wrong-password").await.unwrap_err();
    assert_eq!(err.status(), Some(401));

    // Bearer failures have an empty body.
    let err = client.list_collections("not-a-token").await.unwrap_err();
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn test_telegram_user_manages_collections_and_cards() {
    let (url, _) = spawn_test_server().await;
    let client = CollectorClient::new(url);

    let tokens = client
        .register_telegram(&TelegramRegisterRequest {
            telegram_id: 123456789,
            first_name: "Ivan".to_string(),
            last_name: String::new(),
            username: Some("ivan123".to_string()),
        })
        .await
        .unwrap();
    let token = tokens.access_token.as_str();

    let created = client.create_collection(token, "Modern").await.unwrap();
    assert_eq!(created.name, "Modern");

    let renamed = client
        .rename_collection(token, &created.id, "Legacy")
        .await
        .unwrap();
    assert_eq!(renamed.id, created.id);
    assert_eq!(renamed.name, "Legacy");

    let found = client.find_collection_by_name(token, "Legacy").await.unwrap();
    assert_eq!(found, Some(renamed.clone()));
    assert!(client
        .find_collection_by_name(token, "Modern")
        .await
        .unwrap()
        .is_none());

    client.add_card(token, &created.id, &island(2)).await.unwrap();
    client.add_card(token, &created.id, &island(3)).await.unwrap();
    let cards = client.list_cards(token, &created.id).await.unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].count, 5);

    client.set_card_count(token, &created.id, "X", 1).await.unwrap();
    let collection = client.get_collection(token, &created.id).await.unwrap();
    assert_eq!(collection.cards[0].count, 1);

    let err = client
        .set_card_count(token, &created.id, "missing", 1)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));

    client.delete_card(token, &created.id, "X").await.unwrap();
    assert!(client.list_cards(token, &created.id).await.unwrap().is_empty());

    client.delete_collection(token, &created.id).await.unwrap();
    assert!(client.list_collections(token).await.unwrap().is_empty());
    let err = client.get_collection(token, &created.id).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}
