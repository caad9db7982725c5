//! Per-interaction technical status reported to the client.
//!
//! The snapshot is recomputed for every turn and never persisted; it exists
//! purely so the UI can show which path produced a reply and how long it took.

use serde::{Deserialize, Serialize};

/// State of the chat-completion provider as observed on the last turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStatus {
    /// The provider produced the reply.
    Connected,
    /// The provider failed and the scripted fallback answered instead.
    Degraded,
    /// No provider credential is configured (demo mode).
    NotConfigured,
}

/// Browser speech capability declared by the client at session start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeechStatus {
    Ready,
    NotSupported,
}

impl SpeechStatus {
    pub fn from_supported(supported: bool) -> Self {
        if supported {
            Self::Ready
        } else {
            Self::NotSupported
        }
    }
}

/// Client-visible observability snapshot for one interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalStatus {
    pub provider_status: ProviderStatus,
    pub speech_in_status: SpeechStatus,
    pub speech_out_status: SpeechStatus,
    pub latency_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_fields() {
        let status = TechnicalStatus {
            provider_status: ProviderStatus::NotConfigured,
            speech_in_status: SpeechStatus::Ready,
            speech_out_status: SpeechStatus::from_supported(false),
            latency_ms: 42,
        };
        let json = serde_json::to_value(status).unwrap();
        assert_eq!(json["providerStatus"], "not_configured");
        assert_eq!(json["speechInStatus"], "ready");
        assert_eq!(json["speechOutStatus"], "not_supported");
        assert_eq!(json["latencyMs"], 42);
    }
}
