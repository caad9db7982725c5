mod common;

use axum::http::{Method, StatusCode};
use common::{
    create_session, say, send_json, setup_app, test_state, unavailable_relay, DownGateway,
    ReplyGateway,
};
use saathi_dialogue::{
    UnconfiguredGateway, ACCOUNT_CLEAR_REPLY, CLOSING_REPLY, REGISTRATION_CHECK_REPLY,
};
use saathi_server::app;
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn model_reply_is_returned_and_recorded() {
    let app = setup_app(Arc::new(ReplyGateway("Kya yeh aapka registered number hai?")));
    let id = create_session(&app, json!({ "speechSupported": true })).await;

    let (status, body) = say(&app, &id, "Mujhe ride nahi mil rahi").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "Kya yeh aapka registered number hai?");
    assert_eq!(body["source"], "model");
    assert!(body["elapsedMs"].is_u64());
    assert_eq!(body["technicalStatus"]["providerStatus"], "connected");
    assert_eq!(body["technicalStatus"]["speechInStatus"], "ready");
    assert_eq!(body["technicalStatus"]["speechOutStatus"], "ready");
    assert_eq!(body["technicalStatus"]["latencyMs"], body["elapsedMs"]);

    let (_, messages) =
        send_json(&app, Method::GET, &format!("/api/sessions/{id}/messages"), None).await;
    let messages = messages.as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["speaker"], "user");
    assert_eq!(messages[0]["content"], "Mujhe ride nahi mil rahi");
    assert_eq!(messages[1]["speaker"], "bot");
    assert_eq!(messages[1]["metadata"]["source"], "model");
    assert!(messages[1]["processingTimeMs"].is_u64());
}

#[tokio::test]
async fn scripted_flow_runs_offline() {
    let app = setup_app(Arc::new(UnconfiguredGateway));
    let id = create_session(&app, json!({})).await;

    let (_, first) = say(&app, &id, "Main 2 ghante se online hoon par ride nahi mil rahi").await;
    assert_eq!(first["reply"], REGISTRATION_CHECK_REPLY);
    assert_eq!(first["source"], "fallback");
    assert_eq!(first["technicalStatus"]["providerStatus"], "not_configured");
    assert_eq!(first["technicalStatus"]["speechInStatus"], "not_supported");

    let (_, second) = say(&app, &id, "Haan, yeh mera registered number hai").await;
    assert_eq!(second["reply"], ACCOUNT_CLEAR_REPLY);

    let (_, third) = say(&app, &id, "Theek hai, dhanyawad").await;
    assert_eq!(third["reply"], CLOSING_REPLY);

    let (status, history) =
        send_json(&app, Method::GET, &format!("/api/sessions/{id}/history"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["status"], "active");
    let turns = history["turns"].as_array().unwrap();
    assert_eq!(turns.len(), 7);
    assert_eq!(turns[0]["role"], "system");
    assert_eq!(turns[6]["role"], "assistant");
}

#[tokio::test]
async fn provider_outage_degrades_to_script() {
    let app = setup_app(Arc::new(DownGateway));
    let id = create_session(&app, json!({})).await;

    let (status, body) = say(&app, &id, "Haan").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], ACCOUNT_CLEAR_REPLY);
    assert_eq!(body["source"], "fallback");
    assert_eq!(body["technicalStatus"]["providerStatus"], "degraded");
}

#[tokio::test]
async fn blank_utterance_is_400_and_records_nothing() {
    let app = setup_app(Arc::new(ReplyGateway("unused")));
    let id = create_session(&app, json!({})).await;

    let (status, body) = say(&app, &id, "   ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (_, messages) =
        send_json(&app, Method::GET, &format!("/api/sessions/{id}/messages"), None).await;
    assert!(messages.as_array().unwrap().is_empty());

    let (_, history) =
        send_json(&app, Method::GET, &format!("/api/sessions/{id}/history"), None).await;
    assert_eq!(history["turns"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn utterance_for_unknown_session_is_404() {
    let app = setup_app(Arc::new(UnconfiguredGateway));
    let (status, _) = say(&app, "no-such-session", "hello").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn restart_clears_history_but_keeps_messages() {
    let app = setup_app(Arc::new(UnconfiguredGateway));
    let id = create_session(&app, json!({})).await;
    say(&app, &id, "ride nahi mil rahi").await;
    say(&app, &id, "haan").await;

    let (status, history) =
        send_json(&app, Method::POST, &format!("/api/sessions/{id}/restart"), None).await;
    assert_eq!(status, StatusCode::OK);
    let turns = history["turns"].as_array().unwrap();
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0]["role"], "system");
    assert_eq!(history["status"], "active");

    let (_, messages) =
        send_json(&app, Method::GET, &format!("/api/sessions/{id}/messages"), None).await;
    assert_eq!(messages.as_array().unwrap().len(), 4);

    let (status, body) = say(&app, &id, "ride nahi mil rahi").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], REGISTRATION_CHECK_REPLY);
}

#[tokio::test]
async fn sessions_do_not_share_dialogue() {
    let app = setup_app(Arc::new(UnconfiguredGateway));
    let a = create_session(&app, json!({})).await;
    let b = create_session(&app, json!({})).await;

    say(&app, &a, "ride nahi mil rahi").await;

    let (_, history_b) =
        send_json(&app, Method::GET, &format!("/api/sessions/{b}/history"), None).await;
    assert_eq!(history_b["turns"].as_array().unwrap().len(), 1);

    let (_, history_a) =
        send_json(&app, Method::GET, &format!("/api/sessions/{a}/history"), None).await;
    assert_eq!(history_a["turns"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn concurrent_turns_on_one_session_are_serialized() {
    let app = setup_app(Arc::new(ReplyGateway("ji")));
    let id = create_session(&app, json!({})).await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let app = app.clone();
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            say(&app, &id, &format!("utterance {i}")).await.0
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }

    let (_, history) =
        send_json(&app, Method::GET, &format!("/api/sessions/{id}/history"), None).await;
    let turns = history["turns"].as_array().unwrap();
    assert_eq!(turns.len(), 17);
    for pair in turns[1..].chunks(2) {
        assert_eq!(pair[0]["role"], "user");
        assert_eq!(pair[1]["role"], "assistant");
    }
}

#[tokio::test]
async fn unrecorded_turn_is_rolled_back() {
    let state = test_state(Arc::new(UnconfiguredGateway), unavailable_relay());
    let pool = state.pool.clone();
    let app = app(state);
    let id = create_session(&app, json!({})).await;

    pool.get()
        .unwrap()
        .execute_batch(
            "CREATE TRIGGER reject_bot BEFORE INSERT ON conversation_messages
             WHEN NEW.speaker = 'bot'
             BEGIN SELECT RAISE(ABORT, 'bot replies rejected'); END;",
        )
        .unwrap();

    let (status, body) = say(&app, &id, "haan").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());

    let (_, history) =
        send_json(&app, Method::GET, &format!("/api/sessions/{id}/history"), None).await;
    assert_eq!(history["turns"].as_array().unwrap().len(), 1);
    let (_, messages) =
        send_json(&app, Method::GET, &format!("/api/sessions/{id}/messages"), None).await;
    assert!(messages.as_array().unwrap().is_empty());

    pool.get()
        .unwrap()
        .execute_batch("DROP TRIGGER reject_bot")
        .unwrap();
    let (status, body) = say(&app, &id, "haan").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], ACCOUNT_CLEAR_REPLY);

    let (_, history) =
        send_json(&app, Method::GET, &format!("/api/sessions/{id}/history"), None).await;
    let turns = history["turns"].as_array().unwrap();
    assert_eq!(turns.len(), 3);
    assert_eq!(turns[1]["role"], "user");
    assert_eq!(turns[2]["role"], "assistant");
}
