//! Shared helpers for flashcard-service integration tests.

#![allow(dead_code)]

use axum::{body::Body, http::Request, response::Response, Router};
use flashcard_service::config::{CompletionConfig, FlashcardConfig};
use flashcard_service::services::providers::CompletionProvider;
use flashcard_service::startup::{build_router, AppState};
use service_core::config::Config;
use std::sync::Arc;

pub fn test_config() -> FlashcardConfig {
    FlashcardConfig {
        common: Config {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        completion: CompletionConfig::from_lookup(|_| None).expect("default completion config"),
    }
}

pub fn router_with(provider: Arc<dyn CompletionProvider>) -> Router {
    build_router(AppState::new(&test_config(), provider))
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body")
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).expect("Body is not JSON")
}
