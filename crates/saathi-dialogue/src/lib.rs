//! Scripted dialogue-state engine for the Saathi driver-support assistant.
//!
//! Given a running conversation and a new driver utterance, this crate
//! decides what the assistant says next. Replies come from a hosted
//! chat-completion model when one is reachable, and from a deterministic
//! Hindi rule table when it is not.
//!
//! # Components
//!
//! | Component | Responsibility |
//! |-----------|----------------|
//! | [`DialogueSession`] | Ordered turn history for one conversation, seeded with the system prompt. |
//! | [`ChatGateway`] | One chat-completion call per turn; fails with [`GatewayError`]. |
//! | [`FallbackResponder`] | Rule-based reply used whenever the gateway fails or is unconfigured. |
//! | [`DialogueOrchestrator`] | Runs one turn: append user, complete or fall back, append assistant. |
//!
//! The orchestrator performs no locking. Callers must keep at most one
//! [`DialogueOrchestrator::handle_utterance`] in flight per session, which
//! `&mut DialogueSession` already enforces within a single task.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use saathi_dialogue::{DialogueOrchestrator, DialogueSession, UnconfiguredGateway};
//!
//! let orchestrator = DialogueOrchestrator::new(Arc::new(UnconfiguredGateway));
//! let mut session = DialogueSession::driver_support();
//! let outcome = orchestrator
//!     .handle_utterance(&mut session, "mujhe 2 ghante se ride nahi mil rahi")
//!     .await
//!     .expect("non-blank utterance always yields a reply");
//! ```

mod error;
mod fallback;
mod gateway;
mod orchestrator;
mod prompt;
mod session;

pub use error::{GatewayError, UpstreamError};
pub use fallback::{
    FallbackResponder, ScriptedRule, ACCOUNT_CLEAR_REPLY, CLOSING_REPLY, DEFAULT_REPLY,
    DRIVER_SUPPORT_RULES, REGISTRATION_CHECK_REPLY,
};
pub use gateway::{ChatGateway, DeadlineGateway, UnconfiguredGateway};
pub use orchestrator::{DialogueOrchestrator, FallbackCause, ReplySource, TurnOutcome};
pub use prompt::DRIVER_SUPPORT_PROMPT;
pub use session::DialogueSession;
