//! Shared types for the Saathi driver-support voice assistant.
//!
//! This crate provides the foundational types used across all Saathi crates:
//! conversation roles and turns, session lifecycle status, stored message
//! speakers, language settings, chat-completion options and the per-turn
//! technical status snapshot.
//!
//! No crate in the workspace depends on anything *except* `saathi-types` for
//! cross-cutting type definitions. This keeps the dependency graph clean and
//! prevents circular dependencies.

use serde::{Deserialize, Serialize};

mod status;
pub use status::{ProviderStatus, SpeechStatus, TechnicalStatus};

/// The author of a [`Turn`] in a dialogue history.
///
/// Serialized in lowercase, which is also the chat-completion wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The scripted instructions that seed every dialogue.
    System,
    /// The driver speaking to the assistant.
    User,
    /// The assistant's reply.
    Assistant,
}

impl Role {
    /// Returns the wire label for this role.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Self::System),
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            _ => Err(ParseLabelError::new("role", s)),
        }
    }
}

/// One role-tagged utterance in a conversation history.
///
/// Turns are immutable once created; their position in a history is
/// chronological insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Lifecycle status of a voice session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Active,
    Ended,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Ended => "ended",
        }
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "ended" => Ok(Self::Ended),
            _ => Err(ParseLabelError::new("session status", s)),
        }
    }
}

/// Who produced a persisted conversation message.
///
/// Stored messages use the transcript vocabulary (`user`/`bot`) rather than
/// the chat-completion roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// The driver.
    User,
    /// The support assistant.
    Bot,
}

impl Speaker {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
        }
    }

    /// Returns the label printed in downloadable transcripts.
    pub fn transcript_label(self) -> &'static str {
        match self {
            Self::User => "Driver",
            Self::Bot => "Support Bot",
        }
    }
}

impl std::str::FromStr for Speaker {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "bot" => Ok(Self::Bot),
            _ => Err(ParseLabelError::new("speaker", s)),
        }
    }
}

/// Conversation language of a session.
///
/// Replies are romanized Hindi; the speech locale tells the browser which
/// recognizer and voice to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Hindi,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hindi => "hindi",
        }
    }

    /// BCP-47 locale used by speech recognition and synthesis.
    pub fn speech_locale(self) -> &'static str {
        match self {
            Self::Hindi => "hi-IN",
        }
    }
}

impl std::str::FromStr for Language {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hindi" => Ok(Self::Hindi),
            _ => Err(ParseLabelError::new("language", s)),
        }
    }
}

/// Default chat-completion model.
pub const DEFAULT_CHAT_MODEL: &str = "llama-3.1-8b-instant";

/// Sampling options sent alongside a history to the chat-completion provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatOptions {
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    200
}

fn default_model() -> String {
    DEFAULT_CHAT_MODEL.to_string()
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            model: default_model(),
        }
    }
}

/// Error returned when parsing an unknown label string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLabelError {
    kind: &'static str,
    value: String,
}

impl ParseLabelError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

impl std::fmt::Display for ParseLabelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown {}: {}", self.kind, self.value)
    }
}

impl std::error::Error for ParseLabelError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_labels_parse_back() {
        for role in [Role::System, Role::User, Role::Assistant] {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
    }

    #[test]
    fn unknown_labels_are_rejected() {
        let err = "moderator".parse::<Role>().unwrap_err();
        assert_eq!(err.to_string(), "unknown role: moderator");
        assert!("paused".parse::<SessionStatus>().is_err());
        assert!("agent".parse::<Speaker>().is_err());
        assert!("tamil".parse::<Language>().is_err());
    }

    #[test]
    fn turn_serializes_in_wire_format() {
        let json = serde_json::to_value(Turn::user("namaste")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "namaste"}));
    }

    #[test]
    fn chat_options_defaults() {
        let options = ChatOptions::default();
        assert_eq!(options.temperature, 0.7);
        assert_eq!(options.max_tokens, 200);
        assert_eq!(options.model, "llama-3.1-8b-instant");

        let parsed: ChatOptions = serde_json::from_str(r#"{"max_tokens": 64}"#).unwrap();
        assert_eq!(parsed.max_tokens, 64);
        assert_eq!(parsed.model, DEFAULT_CHAT_MODEL);
    }

    #[test]
    fn speaker_transcript_labels() {
        assert_eq!(Speaker::User.transcript_label(), "Driver");
        assert_eq!(Speaker::Bot.transcript_label(), "Support Bot");
    }

    #[test]
    fn hindi_speech_locale() {
        assert_eq!(Language::default().speech_locale(), "hi-IN");
    }
}
