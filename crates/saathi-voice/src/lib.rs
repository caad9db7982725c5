//! Real-time media relay access for driver voice calls.
//!
//! The browser talks to a LiveKit server for the audio leg of a call; this
//! crate only issues the signed join tokens the browser needs. Whether the
//! relay is usable is decided once, from configuration, when the server
//! starts: [`MediaRelay::from_config`] yields either an available relay or an
//! explicit unavailable state carrying the reason.

pub mod config;
pub mod error;
pub mod relay;
pub mod service;

pub use config::LiveKitConfig;
pub use error::VoiceError;
pub use relay::{MediaRelay, DEFAULT_PARTICIPANT};
pub use service::VoiceService;
