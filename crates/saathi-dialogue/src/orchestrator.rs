//! Dialogue orchestrator: runs one conversational turn end to end.

use std::sync::Arc;
use std::time::Instant;

use saathi_types::{ChatOptions, ProviderStatus, Turn};
use serde::Serialize;

use crate::error::GatewayError;
use crate::fallback::FallbackResponder;
use crate::gateway::ChatGateway;
use crate::session::DialogueSession;

/// Which path produced a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplySource {
    /// The chat provider answered.
    Model,
    /// The scripted fallback answered because the provider could not.
    Fallback(FallbackCause),
}

/// Why the fallback path was taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackCause {
    /// No provider credential is configured.
    NotConfigured,
    /// The provider failed; carries the rendered cause for observability.
    Upstream(String),
}

impl ReplySource {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    /// Short label exposed to clients.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Fallback(_) => "fallback",
        }
    }

    /// Provider state implied by this turn.
    pub fn provider_status(&self) -> ProviderStatus {
        match self {
            Self::Model => ProviderStatus::Connected,
            Self::Fallback(FallbackCause::NotConfigured) => ProviderStatus::NotConfigured,
            Self::Fallback(FallbackCause::Upstream(_)) => ProviderStatus::Degraded,
        }
    }
}

impl Serialize for ReplySource {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Result of one completed turn.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnOutcome {
    pub reply: String,
    pub elapsed_ms: u64,
    pub source: ReplySource,
}

/// Single entry point per driver utterance.
///
/// Every non-blank utterance produces exactly one user turn and one
/// assistant turn. Gateway failures are absorbed here through the
/// [`FallbackResponder`] and never reach the caller.
pub struct DialogueOrchestrator {
    gateway: Arc<dyn ChatGateway>,
    fallback: FallbackResponder,
    options: ChatOptions,
}

impl DialogueOrchestrator {
    /// Creates an orchestrator with the driver-support fallback script and
    /// default chat options.
    pub fn new(gateway: Arc<dyn ChatGateway>) -> Self {
        Self {
            gateway,
            fallback: FallbackResponder::driver_support(),
            options: ChatOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_fallback(mut self, fallback: FallbackResponder) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn gateway(&self) -> &Arc<dyn ChatGateway> {
        &self.gateway
    }

    pub fn fallback(&self) -> &FallbackResponder {
        &self.fallback
    }

    pub fn options(&self) -> &ChatOptions {
        &self.options
    }

    /// Runs one turn for `utterance` against `session`.
    ///
    /// Returns `None` without touching the session or the gateway when the
    /// utterance is empty or whitespace-only.
    pub async fn handle_utterance(
        &self,
        session: &mut DialogueSession,
        utterance: &str,
    ) -> Option<TurnOutcome> {
        if utterance.trim().is_empty() {
            tracing::debug!(session_id = %session.id(), "ignoring blank utterance");
            return None;
        }

        let started = Instant::now();
        session.append_user(utterance);

        let (reply, source) = self.resolve(session.history(), &self.options).await;

        session.append_assistant(reply.clone());
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        tracing::info!(
            session_id = %session.id(),
            source = source.label(),
            elapsed_ms,
            turns = session.len(),
            "dialogue turn completed"
        );

        Some(TurnOutcome {
            reply,
            elapsed_ms,
            source,
        })
    }

    /// Completes an arbitrary history without recording anything.
    ///
    /// Used by the stateless chat endpoint; the same fallback policy applies.
    pub async fn complete_detached(
        &self,
        history: &[Turn],
        options: Option<&ChatOptions>,
    ) -> (String, ReplySource) {
        self.resolve(history, options.unwrap_or(&self.options)).await
    }

    /// One gateway call, with failures folded into the fallback branch.
    async fn resolve(&self, history: &[Turn], options: &ChatOptions) -> (String, ReplySource) {
        match self.gateway.complete(history, options).await {
            Ok(reply) => (reply, ReplySource::Model),
            Err(GatewayError::NotConfigured) => {
                tracing::debug!("chat provider not configured, using scripted reply");
                (
                    self.fallback.respond(history).to_string(),
                    ReplySource::Fallback(FallbackCause::NotConfigured),
                )
            }
            Err(GatewayError::Upstream(cause)) => {
                tracing::warn!(
                    provider = self.gateway.name(),
                    "chat completion failed, using scripted reply: {}",
                    cause
                );
                (
                    self.fallback.respond(history).to_string(),
                    ReplySource::Fallback(FallbackCause::Upstream(cause.to_string())),
                )
            }
        }
    }
}
