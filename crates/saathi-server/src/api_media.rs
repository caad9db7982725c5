//! Media relay join tokens.

use crate::api::ApiError;
use crate::AppState;
use axum::extract::{Extension, Json};
use saathi_voice::VoiceError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    #[serde(default)]
    pub room_name: Option<String>,
    #[serde(default)]
    pub participant_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub url: String,
}

/// Handler for `POST /api/livekit/token`.
pub async fn token_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let room_name = payload
        .room_name
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or_else(|| ApiError::BadRequest("room name is required".to_string()))?;

    let token = state
        .media_relay
        .issue_join_token(room_name, payload.participant_name.as_deref())
        .map_err(|e| match e {
            VoiceError::Unavailable(_) => ApiError::ServiceUnavailable(e.to_string()),
            VoiceError::Config(_) => ApiError::BadRequest(e.to_string()),
            VoiceError::LiveKit(_) => ApiError::InternalServerError(e.to_string()),
        })?;

    tracing::debug!(room = room_name, "issued media relay join token");

    Ok(Json(TokenResponse {
        token,
        url: state.media_relay.public_url().unwrap_or_default().to_string(),
    }))
}
