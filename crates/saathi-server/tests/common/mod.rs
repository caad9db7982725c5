#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use saathi_db::{create_pool, run_migrations, DbPool, DbRuntimeSettings};
use saathi_dialogue::{ChatGateway, DialogueOrchestrator, GatewayError, UpstreamError};
use saathi_server::{app, AppState};
use saathi_types::{ChatOptions, Turn};
use saathi_voice::{LiveKitConfig, MediaRelay};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const LIVEKIT_KEY: &str = "devkey";
pub const LIVEKIT_SECRET: &str = "secret";

/// Gateway that always answers with the same text.
pub struct ReplyGateway(pub &'static str);

#[async_trait]
impl ChatGateway for ReplyGateway {
    fn name(&self) -> &str {
        "reply"
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn complete(
        &self,
        _history: &[Turn],
        _options: &ChatOptions,
    ) -> Result<String, GatewayError> {
        Ok(self.0.to_string())
    }
}

/// Gateway whose provider is always down.
pub struct DownGateway;

#[async_trait]
impl ChatGateway for DownGateway {
    fn name(&self) -> &str {
        "down"
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn complete(
        &self,
        _history: &[Turn],
        _options: &ChatOptions,
    ) -> Result<String, GatewayError> {
        Err(UpstreamError::Transport("connection refused".to_string()).into())
    }
}

pub fn test_pool() -> DbPool {
    let pool = create_pool(":memory:", DbRuntimeSettings::default()).unwrap();
    let conn = pool.get().unwrap();
    run_migrations(&conn).unwrap();
    drop(conn);
    pool
}

pub fn test_state(gateway: Arc<dyn ChatGateway>, relay: MediaRelay) -> AppState {
    AppState::new(
        test_pool(),
        DialogueOrchestrator::new(gateway),
        relay,
        "ola-support",
    )
}

pub fn available_relay() -> MediaRelay {
    MediaRelay::from_config(LiveKitConfig::new(
        "ws://localhost:7880",
        LIVEKIT_KEY,
        LIVEKIT_SECRET,
    ))
}

pub fn unavailable_relay() -> MediaRelay {
    MediaRelay::from_config(LiveKitConfig::default())
}

pub fn setup_app(gateway: Arc<dyn ChatGateway>) -> Router {
    app(test_state(gateway, unavailable_relay()))
}

/// Sends a request and returns the status and raw body.
pub async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, axum::http::HeaderMap, String) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
}

/// Sends a request and parses the JSON response body.
pub async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, _, text) = send_raw(app, method, uri, body).await;
    let json = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or_else(|_| panic!("non-JSON body: {text}"))
    };
    (status, json)
}

/// Creates a session and returns its id.
pub async fn create_session(app: &Router, body: Value) -> String {
    let (status, json) = send_json(app, Method::POST, "/api/sessions", Some(body)).await;
    assert_eq!(status, StatusCode::OK, "create session failed: {json}");
    json["sessionId"].as_str().unwrap().to_string()
}

pub async fn say(app: &Router, session_id: &str, text: &str) -> (StatusCode, Value) {
    send_json(
        app,
        Method::POST,
        &format!("/api/sessions/{session_id}/utterances"),
        Some(serde_json::json!({ "text": text })),
    )
    .await
}
