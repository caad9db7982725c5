//! Error types for chat-completion gateways.

use std::time::Duration;
use thiserror::Error;

/// Why a chat-completion call produced no reply.
///
/// Both variants are recovered by the orchestrator through the fallback
/// responder; neither ever reaches the caller of a turn.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No provider credential is configured. This is the expected demo-mode
    /// path and no network I/O was attempted.
    #[error("chat provider is not configured")]
    NotConfigured,

    /// The provider was contacted but did not yield a usable reply.
    #[error("chat provider failed: {0}")]
    Upstream(#[from] UpstreamError),
}

/// Failure modes of a configured provider.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The provider answered with a non-success HTTP status.
    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The request could not be sent or the response could not be read.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The response body was not a valid chat-completion payload.
    #[error("malformed provider response: {0}")]
    Decode(String),

    /// The response contained zero choices.
    #[error("provider returned no reply choices")]
    EmptyChoices,

    /// The first choice was blank after trimming.
    #[error("provider returned a blank reply")]
    BlankReply,

    /// An external deadline expired before the provider answered.
    #[error("provider did not answer within {0:?}")]
    Deadline(Duration),
}
