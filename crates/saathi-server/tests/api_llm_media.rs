mod common;

use axum::http::{Method, StatusCode};
use common::{
    available_relay, send_json, setup_app, test_state, unavailable_relay, DownGateway,
    ReplyGateway,
};
use saathi_dialogue::{UnconfiguredGateway, DEFAULT_REPLY, REGISTRATION_CHECK_REPLY};
use saathi_server::app;
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn stateless_chat_uses_model() {
    let app = setup_app(Arc::new(ReplyGateway("Boliye")));
    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/llm/chat",
        Some(json!({
            "messages": [
                { "role": "system", "content": "Be brief." },
                { "role": "user", "content": "Namaste" }
            ],
            "temperature": 0.3,
            "maxTokens": 64
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Boliye");
    assert_eq!(body["source"], "model");
}

#[tokio::test]
async fn stateless_chat_falls_back_when_provider_is_down() {
    let app = setup_app(Arc::new(DownGateway));
    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/llm/chat",
        Some(json!({ "messages": [{ "role": "user", "content": "2 ghante se ride nahi mil rahi" }] })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], REGISTRATION_CHECK_REPLY);
    assert_eq!(body["source"], "fallback");
}

#[tokio::test]
async fn stateless_chat_without_user_turn_gets_default_reply() {
    let app = setup_app(Arc::new(UnconfiguredGateway));
    let (_, body) = send_json(
        &app,
        Method::POST,
        "/api/llm/chat",
        Some(json!({ "messages": [{ "role": "system", "content": "prompt" }] })),
    )
    .await;
    assert_eq!(body["message"], DEFAULT_REPLY);
}

#[tokio::test]
async fn stateless_chat_with_empty_history_gets_default_reply() {
    let app = setup_app(Arc::new(UnconfiguredGateway));
    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/llm/chat",
        Some(json!({ "messages": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], DEFAULT_REPLY);
    assert_eq!(body["source"], "fallback");
}

#[tokio::test]
async fn browser_client_paths_reach_the_same_handlers() {
    let app = setup_app(Arc::new(UnconfiguredGateway));

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/groq/chat",
        Some(json!({ "messages": [{ "role": "user", "content": "Mujhe ride nahi mil rahi" }] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], REGISTRATION_CHECK_REPLY);

    let (status, body) = send_json(&app, Method::POST, "/api/groq/chat", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "messages array is required");

    let (status, body) = send_json(&app, Method::GET, "/api/groq/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["healthy"], false);

    let (status, body) = send_json(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["services"]["websocket"], true);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn stateless_chat_rejects_bad_payloads() {
    let app = setup_app(Arc::new(UnconfiguredGateway));

    for payload in [
        json!({}),
        json!({ "messages": "hello" }),
        json!({ "messages": null }),
        json!({ "messages": [{ "role": "wizard", "content": "x" }] }),
    ] {
        let (status, body) =
            send_json(&app, Method::POST, "/api/llm/chat", Some(payload.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {payload}");
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn llm_health_is_false_without_provider_client() {
    let app = setup_app(Arc::new(ReplyGateway("x")));
    let (status, body) = send_json(&app, Method::GET, "/api/llm/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["healthy"], false);
}

#[tokio::test]
async fn model_list_includes_default() {
    let app = setup_app(Arc::new(UnconfiguredGateway));
    let (status, body) = send_json(&app, Method::GET, "/api/llm/models", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["default"], "llama-3.1-8b-instant");
    assert_eq!(body["models"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn token_request_without_relay_is_503() {
    let app = app(test_state(Arc::new(UnconfiguredGateway), unavailable_relay()));
    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/livekit/token",
        Some(json!({ "roomName": "ola-support-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("unavailable"));
}

#[tokio::test]
async fn token_request_without_room_is_400() {
    let app = app(test_state(Arc::new(UnconfiguredGateway), available_relay()));
    let (status, _) = send_json(&app, Method::POST, "/api/livekit/token", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn token_is_signed_with_relay_secret() {
    let app = app(test_state(Arc::new(UnconfiguredGateway), available_relay()));

    let (status, health) = send_json(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["services"]["mediaRelay"], true);

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/livekit/token",
        Some(json!({ "roomName": "ola-support-42", "participantName": "driver-9" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["url"], "ws://localhost:7880");

    let token = body["token"].as_str().unwrap();
    let parts: Vec<&str> = token.split('.').collect();
    assert_eq!(parts.len(), 3, "token should be a JWT");
}

#[tokio::test]
async fn session_reports_relay_url_when_available() {
    let app = app(test_state(Arc::new(UnconfiguredGateway), available_relay()));
    let (status, body) =
        send_json(&app, Method::POST, "/api/sessions", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mediaRelay"]["available"], true);
    assert_eq!(body["mediaRelay"]["url"], "ws://localhost:7880");
}
