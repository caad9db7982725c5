use serde::{Deserialize, Serialize};
use std::fmt;

/// Groq's OpenAI-compatible API root.
pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

fn default_base_url() -> String {
    DEFAULT_GROQ_BASE_URL.to_string()
}

fn default_model() -> String {
    saathi_types::DEFAULT_CHAT_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider API key. Empty means demo mode: every call fails with
    /// `NotConfigured` and the scripted fallback answers.
    #[serde(default, skip_serializing)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model used when the caller does not pick one.
    #[serde(default = "default_model")]
    pub model: String,
    /// HTTP timeout per completion request, in seconds. Default: 15.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl LlmConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}
