use crate::config::LiveKitConfig;
use crate::error::VoiceError;
use crate::service::VoiceService;

/// Identity used when the caller does not name a participant.
pub const DEFAULT_PARTICIPANT: &str = "driver";

/// Media relay state, resolved once at startup.
#[derive(Debug, Clone)]
pub enum MediaRelay {
    Available(VoiceService),
    Unavailable { reason: String },
}

impl MediaRelay {
    pub fn from_config(config: LiveKitConfig) -> Self {
        match VoiceService::new(config) {
            Ok(service) => {
                tracing::info!(url = %service.get_url(), "media relay configured");
                Self::Available(service)
            }
            Err(e) => {
                tracing::warn!("media relay disabled: {}", e);
                Self::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    /// Browser-facing relay URL, when available.
    pub fn public_url(&self) -> Option<&str> {
        match self {
            Self::Available(service) => Some(service.get_public_url()),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        match self {
            Self::Available(_) => None,
            Self::Unavailable { reason } => Some(reason),
        }
    }

    /// Issues a join token for `room_name`. A missing or blank participant
    /// joins as [`DEFAULT_PARTICIPANT`].
    pub fn issue_join_token(
        &self,
        room_name: &str,
        participant: Option<&str>,
    ) -> Result<String, VoiceError> {
        let service = match self {
            Self::Available(service) => service,
            Self::Unavailable { reason } => return Err(VoiceError::Unavailable(reason.clone())),
        };

        if room_name.trim().is_empty() {
            return Err(VoiceError::Config("room name is required".to_string()));
        }

        let identity = participant
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_PARTICIPANT);

        service.generate_join_token(room_name, identity, identity)
    }
}
