//! Chat-completion provider integration for Saathi.
//!
//! Implements [`saathi_dialogue::ChatGateway`] over Groq's
//! OpenAI-compatible REST API. The client sends the whole dialogue history
//! on every call, makes exactly one request per turn and reports every
//! failure as a [`saathi_dialogue::GatewayError`] so the orchestrator can
//! fall back to its scripted replies.

pub mod config;
pub mod groq;

pub use config::{LlmConfig, DEFAULT_GROQ_BASE_URL};
pub use groq::{GroqGateway, LlmError, AVAILABLE_MODELS};
