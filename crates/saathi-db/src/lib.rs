//! Session store for Saathi.
//!
//! Provides SQLite connection pooling (via `r2d2`), embedded SQL migrations,
//! and the voice-session and conversation-message tables. The store records
//! what was said for transcripts and auditing; it carries no durability
//! promise and defaults to an in-memory database.
//!
//! All functions take a borrowed [`rusqlite::Connection`] so callers decide
//! pooling and threading. Async callers run them under
//! `tokio::task::spawn_blocking`.

mod error;
mod messages;
mod migrations;
mod pool;
mod sessions;

pub use error::StoreError;
pub use messages::{
    create_message, get_message, list_session_messages, record_exchange, ConversationMessage,
    NewMessage,
};
pub use migrations::{run_migrations, MigrationError};
pub use pool::{create_pool, DbPool, DbRuntimeSettings, PoolError, IN_MEMORY_PATH};
pub use sessions::{
    create_voice_session, end_voice_session, get_voice_session, NewVoiceSession, VoiceSession,
    DEFAULT_SCENARIO,
};

/// Current UTC time as stored in every timestamp column.
pub(crate) const NOW_SQL: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";
