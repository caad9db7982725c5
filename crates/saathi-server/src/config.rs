//! Server configuration loading from file and environment variables.

use saathi_llm::LlmConfig;
use saathi_types::ChatOptions;
use saathi_voice::LiveKitConfig;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Chat-completion provider.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Real-time media relay.
    #[serde(default)]
    pub livekit: LiveKitConfig,

    #[serde(default)]
    pub dialogue: DialogueConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file, or `:memory:`.
    #[serde(default = "default_db_path")]
    pub path: String,

    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "saathi_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

/// Conversation tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct DialogueConfig {
    /// Prefix of generated media room names.
    #[serde(default = "default_room_prefix")]
    pub room_prefix: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Upper bound on one model call, in seconds. The scripted reply is used
    /// once it passes.
    #[serde(default = "default_reply_deadline_secs")]
    pub reply_deadline_secs: u64,
}

impl DialogueConfig {
    /// Sampling options for turns, using `model` from the provider config.
    pub fn chat_options(&self, model: &str) -> ChatOptions {
        ChatOptions {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            model: model.to_string(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    5000
}

fn default_db_path() -> String {
    saathi_db::IN_MEMORY_PATH.to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_pool_max_size() -> u32 {
    8
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_room_prefix() -> String {
    "ola-support".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    200
}

fn default_reply_deadline_secs() -> u64 {
    20
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            pool_max_size: default_pool_max_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            room_prefix: default_room_prefix(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            reply_deadline_secs: default_reply_deadline_secs(),
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `SAATHI_HOST`, `SAATHI_PORT` override `server.*`
/// - `SAATHI_DB_PATH` overrides `database.path`
/// - `SAATHI_LOG_LEVEL`, `SAATHI_LOG_JSON` override `logging.*`
/// - `GROQ_API_KEY` (or `GROQ_CLOUD_API_KEY`), `GROQ_BASE_URL`, `GROQ_MODEL`
///   override `llm.*`
/// - `LIVEKIT_URL`, `LIVEKIT_API_KEY`, `LIVEKIT_API_SECRET` override `livekit.*`
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Applies environment overrides using `lookup` to read variables.
pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(host) = lookup("SAATHI_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Some(port) = lookup("SAATHI_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Some(db_path) = lookup("SAATHI_DB_PATH") {
        config.database.path = db_path;
    }
    if let Some(level) = lookup("SAATHI_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = lookup("SAATHI_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }

    if let Some(key) = lookup("GROQ_API_KEY").or_else(|| lookup("GROQ_CLOUD_API_KEY")) {
        config.llm.api_key = key;
    }
    if let Some(url) = lookup("GROQ_BASE_URL") {
        config.llm.base_url = url;
    }
    if let Some(model) = lookup("GROQ_MODEL") {
        config.llm.model = model;
    }

    if let Some(url) = lookup("LIVEKIT_URL") {
        config.livekit.url = url;
    }
    if let Some(key) = lookup("LIVEKIT_API_KEY") {
        config.livekit.api_key = key;
    }
    if let Some(secret) = lookup("LIVEKIT_API_SECRET") {
        config.livekit.api_secret = secret;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_run_in_memory_demo_mode() {
        let config = Config::default();
        assert_eq!(config.database.path, ":memory:");
        assert_eq!(config.dialogue.room_prefix, "ola-support");
        assert!(!config.llm.is_configured());
        assert!(!config.livekit.is_complete());
    }

    #[test]
    fn toml_sections_parse() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 8080

            [llm]
            api_key = "gsk_test"
            timeout_secs = 5

            [livekit]
            url = "wss://lk.example.com"

            [dialogue]
            room_prefix = "night-support"
            max_tokens = 120
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert!(config.llm.is_configured());
        assert_eq!(config.llm.timeout_secs, 5);
        assert_eq!(config.livekit.url, "wss://lk.example.com");
        assert_eq!(config.livekit.token_ttl_seconds, 3600);
        assert_eq!(config.dialogue.room_prefix, "night-support");
        assert_eq!(config.dialogue.max_tokens, 120);
        assert_eq!(config.dialogue.reply_deadline_secs, 20);
    }

    #[test]
    fn env_overrides_win() {
        let mut config = Config::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("SAATHI_PORT", "9000"),
                ("SAATHI_LOG_JSON", "1"),
                ("GROQ_CLOUD_API_KEY", "legacy"),
                ("LIVEKIT_API_SECRET", "s3cret"),
            ]),
        );

        assert_eq!(config.server.port, 9000);
        assert!(config.logging.json);
        assert_eq!(config.llm.api_key, "legacy");
        assert_eq!(config.livekit.api_secret, "s3cret");
    }

    #[test]
    fn primary_groq_key_beats_legacy_name() {
        let mut config = Config::default();
        apply_env_overrides(
            &mut config,
            env(&[("GROQ_API_KEY", "primary"), ("GROQ_CLOUD_API_KEY", "legacy")]),
        );
        assert_eq!(config.llm.api_key, "primary");
    }

    #[test]
    fn unparsable_port_is_ignored() {
        let mut config = Config::default();
        apply_env_overrides(&mut config, env(&[("SAATHI_PORT", "not-a-port")]));
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load_config(Some("/nonexistent/saathi.toml")).unwrap();
        assert_eq!(config.dialogue.room_prefix, "ola-support");
    }

    #[test]
    fn chat_options_carry_model() {
        let options = DialogueConfig::default().chat_options("gemma-7b-it");
        assert_eq!(options.model, "gemma-7b-it");
        assert_eq!(options.max_tokens, 200);
    }
}
