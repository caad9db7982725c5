//! Saathi server library logic.
//!
//! HTTP and WebSocket façade over the dialogue engine: session lifecycle,
//! utterance handling, transcripts, media-relay join tokens and a stateless
//! chat proxy.

pub mod api;
pub mod api_dialogue;
pub mod api_llm;
pub mod api_media;
pub mod api_sessions;
pub mod api_ws;
pub mod config;
pub mod dialogues;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use config::Config;
use dialogues::DialogueRegistry;
use saathi_db::{DbPool, DbRuntimeSettings, MigrationError, PoolError};
use saathi_dialogue::{DeadlineGateway, DialogueOrchestrator};
use saathi_llm::{GroqGateway, LlmError};
use saathi_voice::MediaRelay;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Session store connection pool.
    pub pool: DbPool,
    /// Turn handling, shared by every session.
    pub orchestrator: Arc<DialogueOrchestrator>,
    /// Concrete provider client, kept for health probes and the model list.
    /// `None` when the server runs with an injected gateway.
    pub llm: Option<Arc<GroqGateway>>,
    /// Media relay, resolved once at startup.
    pub media_relay: Arc<MediaRelay>,
    /// Live dialogues by session id.
    pub dialogues: DialogueRegistry,
    /// Prefix of generated room names.
    pub room_prefix: String,
}

/// Errors that stop the server from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error("failed to get database connection: {0}")]
    Connection(#[from] r2d2::Error),
    #[error(transparent)]
    Migration(#[from] MigrationError),
    #[error(transparent)]
    Llm(#[from] LlmError),
}

impl AppState {
    pub fn new(
        pool: DbPool,
        orchestrator: DialogueOrchestrator,
        media_relay: MediaRelay,
        room_prefix: impl Into<String>,
    ) -> Self {
        Self {
            pool,
            orchestrator: Arc::new(orchestrator),
            llm: None,
            media_relay: Arc::new(media_relay),
            dialogues: DialogueRegistry::new(),
            room_prefix: room_prefix.into(),
        }
    }

    pub fn with_llm_client(mut self, client: Arc<GroqGateway>) -> Self {
        self.llm = Some(client);
        self
    }

    /// Opens the store, applies migrations and wires the provider, relay and
    /// orchestrator described by `config`.
    pub fn from_config(config: &Config) -> Result<Self, StartupError> {
        let pool = saathi_db::create_pool(
            &config.database.path,
            DbRuntimeSettings {
                busy_timeout_ms: config.database.busy_timeout_ms,
                pool_max_size: config.database.pool_max_size,
            },
        )?;

        {
            let conn = pool.get()?;
            let applied = saathi_db::run_migrations(&conn)?;
            if applied > 0 {
                tracing::info!(count = applied, "applied database migrations");
            }
        }

        let client = Arc::new(GroqGateway::new(config.llm.clone())?);
        let gateway = DeadlineGateway::new(
            client.clone(),
            Duration::from_secs(config.dialogue.reply_deadline_secs),
        );
        let orchestrator = DialogueOrchestrator::new(Arc::new(gateway))
            .with_options(config.dialogue.chat_options(&config.llm.model));

        let media_relay = MediaRelay::from_config(config.livekit.clone());

        Ok(Self::new(pool, orchestrator, media_relay, &config.dialogue.room_prefix)
            .with_llm_client(client))
    }
}

/// Maximum request body size (1 MiB).
const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

/// Handler for `GET /health` and `GET /api/health`.
async fn health(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        "services": {
            "llm": state.orchestrator.gateway().is_configured(),
            "mediaRelay": state.media_relay.is_available(),
            "websocket": true
        }
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/health", get(health))
        .route("/api/sessions", post(api_sessions::create_session_handler))
        .route(
            "/api/sessions/{sessionId}",
            get(api_sessions::get_session_handler),
        )
        .route(
            "/api/sessions/{sessionId}/end",
            patch(api_sessions::end_session_handler),
        )
        .route(
            "/api/sessions/{sessionId}/messages",
            get(api_sessions::list_messages_handler),
        )
        .route(
            "/api/sessions/{sessionId}/transcript",
            get(api_sessions::transcript_handler),
        )
        .route(
            "/api/sessions/{sessionId}/utterances",
            post(api_dialogue::utterance_handler),
        )
        .route(
            "/api/sessions/{sessionId}/restart",
            post(api_dialogue::restart_handler),
        )
        .route(
            "/api/sessions/{sessionId}/history",
            get(api_dialogue::history_handler),
        )
        .route("/api/messages", post(api_sessions::create_message_handler))
        .route("/api/livekit/token", post(api_media::token_handler))
        .route("/api/llm/chat", post(api_llm::chat_handler))
        .route("/api/llm/health", get(api_llm::health_handler))
        .route("/api/llm/models", get(api_llm::models_handler))
        // Paths used by the browser client.
        .route("/api/groq/chat", post(api_llm::chat_handler))
        .route("/api/groq/health", get(api_llm::health_handler))
        .route("/ws", get(api_ws::ws_handler))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .layer(Extension(Arc::new(state)))
}
