//! Utterance handling and dialogue control for persisted sessions.

use crate::api::{with_store, ApiError};
use crate::dialogues::LiveDialogue;
use crate::AppState;
use axum::extract::{Extension, Json, Path};
use saathi_db::{get_voice_session, record_exchange, NewMessage};
use saathi_dialogue::{DialogueSession, DRIVER_SUPPORT_PROMPT};
use saathi_types::{SessionStatus, Speaker, TechnicalStatus, Turn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct UtteranceRequest {
    #[serde(default)]
    pub text: String,
}

/// Result of one driver turn, shared by the HTTP and WebSocket surfaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnReply {
    pub reply: String,
    pub elapsed_ms: u64,
    pub source: String,
    pub technical_status: TechnicalStatus,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub session_id: String,
    pub status: SessionStatus,
    pub turns: Vec<Turn>,
}

/// Returns the live dialogue for a persisted session.
///
/// Sessions recorded by an earlier process start over from the system turn.
pub async fn live_dialogue(
    state: &AppState,
    session_id: &str,
) -> Result<Arc<LiveDialogue>, ApiError> {
    if let Some(live) = state.dialogues.get(session_id) {
        return Ok(live);
    }

    let id = session_id.to_string();
    let session = with_store(state, move |conn| get_voice_session(conn, &id)).await?;
    let uuid = Uuid::parse_str(&session.session_id)
        .map_err(|e| ApiError::InternalServerError(format!("invalid session id: {}", e)))?;

    Ok(state.dialogues.get_or_insert_with(session_id, || {
        tracing::info!(session_id = %session.session_id, "restoring dialogue for stored session");
        let mut dialogue = DialogueSession::with_id(uuid, DRIVER_SUPPORT_PROMPT);
        if session.status == SessionStatus::Ended {
            dialogue.end();
        }
        LiveDialogue::new(dialogue, session.speech_supported)
    }))
}

/// Runs one driver utterance through the orchestrator and records both
/// sides of the exchange.
///
/// The session's dialogue lock is held for the whole turn. Blank text is
/// rejected before anything is recorded. If the exchange cannot be stored,
/// the turn is removed from the dialogue again.
pub async fn run_turn(
    state: &AppState,
    session_id: &str,
    text: &str,
) -> Result<TurnReply, ApiError> {
    if text.trim().is_empty() {
        return Err(ApiError::BadRequest("text is required".to_string()));
    }

    let live = live_dialogue(state, session_id).await?;
    let mut dialogue = live.dialogue().lock().await;
    if !dialogue.is_active() {
        return Err(ApiError::Conflict(format!("session {} has ended", session_id)));
    }

    let turns_before = dialogue.len();
    let outcome = state
        .orchestrator
        .handle_utterance(&mut dialogue, text)
        .await
        .ok_or_else(|| ApiError::BadRequest("text is required".to_string()))?;

    let technical_status = live.technical_status(&outcome.source, outcome.elapsed_ms);
    let source = outcome.source.label().to_string();

    let user = NewMessage::new(session_id, Speaker::User, text);
    let bot = NewMessage::new(session_id, Speaker::Bot, outcome.reply.clone())
        .with_processing_time(outcome.elapsed_ms)
        .with_metadata(json!({ "source": source }));
    if let Err(err) = with_store(state, move |conn| record_exchange(conn, &user, &bot)).await {
        dialogue.truncate_to(turns_before);
        tracing::warn!(session_id = %session_id, "turn not recorded, history rolled back: {}", err);
        return Err(err);
    }

    drop(dialogue);

    Ok(TurnReply {
        reply: outcome.reply,
        elapsed_ms: outcome.elapsed_ms,
        source,
        technical_status,
    })
}

/// Handler for `POST /api/sessions/{sessionId}/utterances`.
pub async fn utterance_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(payload): Json<UtteranceRequest>,
) -> Result<Json<TurnReply>, ApiError> {
    let reply = run_turn(&state, &session_id, &payload.text).await?;
    Ok(Json(reply))
}

/// Resets a session's dialogue to its system turn. Recorded messages stay.
pub async fn restart_dialogue(state: &AppState, session_id: &str) -> Result<(), ApiError> {
    let live = live_dialogue(state, session_id).await?;
    live.dialogue().lock().await.reset();
    tracing::info!(session_id = %session_id, "dialogue restarted");
    Ok(())
}

/// Handler for `POST /api/sessions/{sessionId}/restart`.
pub async fn restart_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    restart_dialogue(&state, &session_id).await?;
    history_handler(Extension(state), Path(session_id)).await
}

/// Handler for `GET /api/sessions/{sessionId}/history`.
pub async fn history_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let live = live_dialogue(&state, &session_id).await?;
    let dialogue = live.dialogue().lock().await;
    Ok(Json(HistoryResponse {
        session_id,
        status: dialogue.status(),
        turns: dialogue.snapshot(),
    }))
}
