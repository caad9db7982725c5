//! WebSocket transcript channel for a voice session.
//!
//! The browser streams speech-recognition transcripts; every final,
//! non-blank transcript runs one dialogue turn and the reply is pushed back
//! on the same socket.

use crate::api::ApiError;
use crate::api_dialogue::{live_dialogue, restart_dialogue, run_turn, TurnReply};
use crate::AppState;
use axum::{
    extract::{
        ws::{Message as AxumMessage, WebSocket},
        Extension, Query, WebSocketUpgrade,
    },
    response::{IntoResponse, Response},
};
use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct WsConnectParams {
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

/// Incoming WebSocket message types.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum IncomingMessage {
    #[serde(rename = "transcript")]
    Transcript {
        #[serde(default)]
        text: String,
        /// Interim recognizer output is ignored. Missing means final.
        #[serde(rename = "isFinal", default = "default_is_final")]
        is_final: bool,
    },
    #[serde(rename = "restart")]
    Restart {},
    /// Raw audio frames are carried by the media relay, not this socket.
    #[serde(rename = "audio-data")]
    AudioData {},
}

fn default_is_final() -> bool {
    true
}

/// Outgoing WebSocket message types.
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum OutgoingMessage {
    #[serde(rename = "reply")]
    Reply(TurnReply),
    #[serde(rename = "restarted")]
    Restarted,
    #[serde(rename = "error")]
    Error { message: String },
}

/// Handler for `GET /ws?sessionId=<id>`.
pub async fn ws_handler(
    Extension(state): Extension<Arc<AppState>>,
    ws: WebSocketUpgrade,
    Query(params): Query<WsConnectParams>,
) -> Response {
    let Some(session_id) = params.session_id.filter(|id| !id.trim().is_empty()) else {
        return ApiError::BadRequest("sessionId is required".to_string()).into_response();
    };

    if let Err(e) = live_dialogue(&state, &session_id).await {
        tracing::warn!(session_id = %session_id, "websocket connect rejected: {}", e);
        return e.into_response();
    }

    tracing::info!(session_id = %session_id, "websocket connected");
    ws.on_upgrade(move |socket| handle_socket(socket, state, session_id))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, session_id: String) {
    let (mut sender, mut receiver) = socket.split();

    while let Some(Ok(msg)) = receiver.next().await {
        let text = match msg {
            AxumMessage::Text(text) => text,
            AxumMessage::Close(_) => break,
            _ => continue,
        };

        let incoming = match serde_json::from_str::<IncomingMessage>(text.as_str()) {
            Ok(incoming) => incoming,
            Err(e) => {
                tracing::debug!(session_id = %session_id, "unrecognized websocket message: {}", e);
                send(
                    &mut sender,
                    &OutgoingMessage::Error {
                        message: "unrecognized message".to_string(),
                    },
                )
                .await;
                continue;
            }
        };

        let outgoing = match incoming {
            IncomingMessage::Transcript { text, is_final } => {
                if !is_final || text.trim().is_empty() {
                    continue;
                }
                match run_turn(&state, &session_id, &text).await {
                    Ok(reply) => OutgoingMessage::Reply(reply),
                    Err(e) => OutgoingMessage::Error {
                        message: e.to_string(),
                    },
                }
            }
            IncomingMessage::Restart {} => match restart_dialogue(&state, &session_id).await {
                Ok(()) => OutgoingMessage::Restarted,
                Err(e) => OutgoingMessage::Error {
                    message: e.to_string(),
                },
            },
            IncomingMessage::AudioData {} => continue,
        };

        if !send(&mut sender, &outgoing).await {
            break;
        }
    }

    tracing::info!(session_id = %session_id, "websocket disconnected");
}

/// Serializes and sends one message. Returns false once the peer is gone.
async fn send(sender: &mut SplitSink<WebSocket, AxumMessage>, message: &OutgoingMessage) -> bool {
    let json = match serde_json::to_string(message) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("failed to serialize websocket message: {}", e);
            return true;
        }
    };
    sender.send(AxumMessage::Text(json.into())).await.is_ok()
}
