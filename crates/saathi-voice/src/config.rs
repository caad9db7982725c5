use serde::{Deserialize, Serialize};
use std::fmt;

fn default_token_ttl_seconds() -> u64 {
    3600
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LiveKitConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default, skip_serializing)]
    pub api_secret: String,
    /// JWT token TTL in seconds for LiveKit join tokens. Default: 3600 (1 hour).
    #[serde(default = "default_token_ttl_seconds")]
    pub token_ttl_seconds: u64,
    /// URL handed to browsers. Falls back to `url` when empty.
    #[serde(default)]
    pub public_url: String,
}

impl Default for LiveKitConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            token_ttl_seconds: default_token_ttl_seconds(),
            public_url: String::new(),
        }
    }
}

impl fmt::Debug for LiveKitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveKitConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("public_url", &self.public_url)
            .finish()
    }
}

impl LiveKitConfig {
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            ..Self::default()
        }
    }

    /// Names the first required credential that is blank, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.url.trim().is_empty() {
            Some("url")
        } else if self.api_key.trim().is_empty() {
            Some("api_key")
        } else if self.api_secret.trim().is_empty() {
            Some("api_secret")
        } else {
            None
        }
    }

    pub fn is_complete(&self) -> bool {
        self.missing_field().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_secret() {
        let config = LiveKitConfig::new("ws://localhost:7880", "devkey", "hunter2");
        let debug = format!("{:?}", config);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn missing_field_reports_first_gap() {
        assert_eq!(LiveKitConfig::default().missing_field(), Some("url"));
        assert_eq!(
            LiveKitConfig::new("ws://lk", "", "s").missing_field(),
            Some("api_key")
        );
        assert_eq!(
            LiveKitConfig::new("ws://lk", "k", "  ").missing_field(),
            Some("api_secret")
        );
        assert!(LiveKitConfig::new("ws://lk", "k", "s").is_complete());
    }

    #[test]
    fn toml_section_uses_defaults() {
        let config: LiveKitConfig = toml::from_str(r#"url = "ws://lk:7880""#).unwrap();
        assert_eq!(config.token_ttl_seconds, 3600);
        assert!(config.api_key.is_empty());
        assert!(config.public_url.is_empty());
    }
}
