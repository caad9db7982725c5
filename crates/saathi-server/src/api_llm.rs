//! Stateless chat proxy and provider probes.

use crate::api::ApiError;
use crate::AppState;
use axum::extract::{Extension, Json};
use saathi_llm::AVAILABLE_MODELS;
use saathi_types::Turn;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Request body for `POST /api/llm/chat` and `POST /api/groq/chat`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub messages: Vec<Turn>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: String,
    pub source: String,
}

/// Handler for `POST /api/llm/chat` and `POST /api/groq/chat`.
///
/// Completes a caller-supplied history without touching any session. A
/// provider failure still yields a scripted reply, and an empty history gets
/// the default one.
pub async fn chat_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<ChatResponse>, ApiError> {
    if !body.get("messages").is_some_and(Value::is_array) {
        return Err(ApiError::BadRequest("messages array is required".to_string()));
    }
    let request: ChatRequest = serde_json::from_value(body)
        .map_err(|e| ApiError::BadRequest(format!("invalid chat request: {}", e)))?;

    let mut options = state.orchestrator.options().clone();
    if let Some(temperature) = request.temperature {
        options.temperature = temperature;
    }
    if let Some(max_tokens) = request.max_tokens {
        options.max_tokens = max_tokens;
    }

    let (message, source) = state
        .orchestrator
        .complete_detached(&request.messages, Some(&options))
        .await;

    Ok(Json(ChatResponse {
        message,
        source: source.label().to_string(),
    }))
}

/// Handler for `GET /api/llm/health` and `GET /api/groq/health`.
pub async fn health_handler(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    let healthy = match &state.llm {
        Some(client) => client.health_check().await,
        None => false,
    };
    Json(json!({ "healthy": healthy }))
}

/// Handler for `GET /api/llm/models`.
pub async fn models_handler(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "models": AVAILABLE_MODELS,
        "default": state.orchestrator.options().model,
    }))
}
