//! Session lifecycle, message persistence and transcript download.

use crate::api::{with_store, ApiError};
use crate::dialogues::LiveDialogue;
use crate::AppState;
use axum::{
    extract::{Extension, Json, Path},
    http::header,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use saathi_db::{
    create_message, create_voice_session, end_voice_session, get_voice_session,
    list_session_messages, ConversationMessage, NewMessage, NewVoiceSession, StoreError,
    VoiceSession,
};
use saathi_dialogue::{DialogueSession, DRIVER_SUPPORT_PROMPT};
use saathi_types::Language;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// Request body for `POST /api/sessions`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub scenario: Option<String>,
    pub language: Option<String>,
    pub speech_supported: Option<bool>,
    pub metadata: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRelayInfo {
    pub available: bool,
    pub url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub room_name: String,
    pub language: Language,
    pub speech_locale: String,
    pub media_relay: MediaRelayInfo,
}

/// Handler for `POST /api/sessions`.
pub async fn create_session_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<Json<CreateSessionResponse>, ApiError> {
    let language = match payload.language.as_deref().map(str::trim) {
        None | Some("") => Language::default(),
        Some(label) => label
            .to_lowercase()
            .parse::<Language>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
    };
    let speech_supported = payload.speech_supported.unwrap_or(false);

    let mut new = NewVoiceSession {
        room_name: room_name(&state.room_prefix),
        scenario: payload.scenario,
        language,
        speech_supported,
        metadata: payload.metadata,
    };

    let session = with_store(&state, move |conn| match create_voice_session(conn, &new) {
        // Two sessions created in the same millisecond share a room name.
        Err(StoreError::Conflict(_)) => {
            let suffix = Uuid::new_v4().simple().to_string();
            new.room_name = format!("{}-{}", new.room_name, &suffix[..8]);
            create_voice_session(conn, &new)
        }
        other => other,
    })
    .await?;

    let id = Uuid::parse_str(&session.session_id)
        .map_err(|e| ApiError::InternalServerError(format!("invalid session id: {}", e)))?;
    state.dialogues.insert(
        session.session_id.clone(),
        LiveDialogue::new(
            DialogueSession::with_id(id, DRIVER_SUPPORT_PROMPT),
            session.speech_supported,
        ),
    );

    tracing::info!(
        session_id = %session.session_id,
        room = %session.room_name,
        speech_supported,
        "voice session started"
    );

    Ok(Json(CreateSessionResponse {
        session_id: session.session_id,
        room_name: session.room_name,
        language: session.language,
        speech_locale: session.language.speech_locale().to_string(),
        media_relay: MediaRelayInfo {
            available: state.media_relay.is_available(),
            url: state.media_relay.public_url().map(str::to_string),
        },
    }))
}

/// Handler for `GET /api/sessions/{sessionId}`.
pub async fn get_session_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<VoiceSession>, ApiError> {
    let session = with_store(&state, move |conn| get_voice_session(conn, &session_id)).await?;
    Ok(Json(session))
}

/// Handler for `PATCH /api/sessions/{sessionId}/end`.
pub async fn end_session_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<VoiceSession>, ApiError> {
    let id = session_id.clone();
    let session = with_store(&state, move |conn| end_voice_session(conn, &id)).await?;

    if let Some(live) = state.dialogues.get(&session_id) {
        live.dialogue().lock().await.end();
    }

    tracing::info!(session_id = %session_id, "voice session ended");
    Ok(Json(session))
}

/// Handler for `POST /api/messages`.
pub async fn create_message_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<NewMessage>,
) -> Result<Json<ConversationMessage>, ApiError> {
    if payload.content.trim().is_empty() {
        return Err(ApiError::BadRequest("content is required".to_string()));
    }

    let message = with_store(&state, move |conn| create_message(conn, &payload)).await?;
    Ok(Json(message))
}

/// Handler for `GET /api/sessions/{sessionId}/messages`.
pub async fn list_messages_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<ConversationMessage>>, ApiError> {
    let messages = with_store(&state, move |conn| {
        get_voice_session(conn, &session_id)?;
        list_session_messages(conn, &session_id)
    })
    .await?;
    Ok(Json(messages))
}

/// Handler for `GET /api/sessions/{sessionId}/transcript`.
pub async fn transcript_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let messages = with_store(&state, move |conn| {
        get_voice_session(conn, &session_id)?;
        list_session_messages(conn, &session_id)
    })
    .await?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        transcript_filename(Utc::now())
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        render_transcript(&messages),
    ))
}

/// Renders one `[HH:MM:SS] Speaker: text` line per message.
pub fn render_transcript(messages: &[ConversationMessage]) -> String {
    messages
        .iter()
        .map(|message| {
            format!(
                "[{}] {}: {}",
                clock_time(&message.timestamp),
                message.speaker.transcript_label(),
                message.display_text()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn transcript_filename(now: DateTime<Utc>) -> String {
    format!("driver-support-transcript-{}.txt", now.format("%Y-%m-%d"))
}

fn clock_time(timestamp: &str) -> String {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(parsed) => parsed.format("%H:%M:%S").to_string(),
        Err(_) => timestamp.to_string(),
    }
}

/// `{prefix}-{unix millis}`.
fn room_name(prefix: &str) -> String {
    format!("{}-{}", prefix, Utc::now().timestamp_millis())
}
