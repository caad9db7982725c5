use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use saathi_dialogue::{ChatGateway, GatewayError, UpstreamError};
use saathi_types::{ChatOptions, Turn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::LlmConfig;

/// Models known to work with the driver-support prompt.
pub const AVAILABLE_MODELS: &[&str] = &[
    "llama-3.1-8b-instant",
    "llama-3.1-70b-versatile",
    "mixtral-8x7b-32768",
    "gemma-7b-it",
];

/// Timeout for the lightweight `/models` health probe.
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Groq chat-completion client.
#[derive(Debug, Clone)]
pub struct GroqGateway {
    client: Client,
    config: LlmConfig,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Turn],
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl GroqGateway {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        if !config.is_configured() {
            tracing::warn!("GROQ API key not found; replies will use the scripted fallback");
        }
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    pub fn available_models(&self) -> &'static [&'static str] {
        AVAILABLE_MODELS
    }

    /// Probes `GET {base}/models`. Returns false when unconfigured or on any
    /// failure; never errors.
    pub async fn health_check(&self) -> bool {
        if !self.config.is_configured() {
            return false;
        }

        match self
            .client
            .get(format!("{}/models", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .timeout(HEALTH_CHECK_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::warn!("Groq health check failed: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl ChatGateway for GroqGateway {
    fn name(&self) -> &str {
        "groq"
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    async fn complete(
        &self,
        history: &[Turn],
        options: &ChatOptions,
    ) -> Result<String, GatewayError> {
        if !self.config.is_configured() {
            return Err(GatewayError::NotConfigured);
        }

        let model = if options.model.is_empty() {
            self.config.model.as_str()
        } else {
            options.model.as_str()
        };

        let body = ChatRequest {
            model,
            messages: history,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            top_p: 1.0,
            stream: false,
        };

        debug!(model, turns = history.len(), "sending chat completion to Groq");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))?;

        let first = chat
            .choices
            .into_iter()
            .next()
            .ok_or(UpstreamError::EmptyChoices)?;

        let reply = first.message.content.unwrap_or_default().trim().to_string();
        if reply.is_empty() {
            return Err(UpstreamError::BlankReply.into());
        }

        Ok(reply)
    }
}
