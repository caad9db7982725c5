//! Voice session records.

use rusqlite::{params, Connection, OptionalExtension, Row};
use saathi_types::{Language, SessionStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{conversion_error, is_unique_violation, StoreError};
use crate::NOW_SQL;

/// Scenario recorded when the caller does not name one.
pub const DEFAULT_SCENARIO: &str = "driver_support";

/// A persisted voice session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSession {
    pub session_id: String,
    pub room_name: String,
    pub status: SessionStatus,
    pub scenario: String,
    pub language: Language,
    pub speech_supported: bool,
    /// RFC 3339 UTC timestamp.
    pub started_at: String,
    pub ended_at: Option<String>,
    pub metadata: Value,
}

/// Parameters for creating a voice session.
#[derive(Debug, Clone, Default)]
pub struct NewVoiceSession {
    pub room_name: String,
    pub scenario: Option<String>,
    pub language: Language,
    pub speech_supported: bool,
    pub metadata: Option<Value>,
}

const SESSION_COLUMNS: &str = "session_id, room_name, status, scenario, language, \
     speech_supported, started_at, ended_at, metadata";

/// Creates a voice session with a fresh UUID.
///
/// Fails with [`StoreError::Conflict`] when the room name is taken.
pub fn create_voice_session(
    conn: &Connection,
    new: &NewVoiceSession,
) -> Result<VoiceSession, StoreError> {
    let session_id = uuid::Uuid::new_v4().to_string();
    let scenario = new
        .scenario
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SCENARIO);
    let metadata = match &new.metadata {
        Some(value) => serde_json::to_string(value)?,
        None => "{}".to_string(),
    };

    let sql = format!(
        "INSERT INTO voice_sessions (
            session_id, room_name, status, scenario, language,
            speech_supported, started_at, metadata
        ) VALUES (?1, ?2, 'active', ?3, ?4, ?5, {NOW_SQL}, ?6)
        RETURNING {SESSION_COLUMNS}"
    );

    let session = conn
        .query_row(
            &sql,
            params![
                session_id,
                new.room_name,
                scenario,
                new.language.as_str(),
                new.speech_supported,
                metadata,
            ],
            map_row_to_session,
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Conflict(format!("room {}", new.room_name))
            } else {
                StoreError::Database(e)
            }
        })?;

    tracing::debug!(
        session_id = %session.session_id,
        room = %session.room_name,
        "voice session created"
    );
    Ok(session)
}

/// Retrieves a voice session by its public ID.
pub fn get_voice_session(conn: &Connection, session_id: &str) -> Result<VoiceSession, StoreError> {
    conn.query_row(
        &format!("SELECT {SESSION_COLUMNS} FROM voice_sessions WHERE session_id = ?1"),
        [session_id],
        map_row_to_session,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found("voice session", session_id))
}

/// Marks a session ended. Ending twice keeps the first `ended_at`.
pub fn end_voice_session(conn: &Connection, session_id: &str) -> Result<VoiceSession, StoreError> {
    let changed = conn.execute(
        &format!(
            "UPDATE voice_sessions
             SET status = 'ended', ended_at = COALESCE(ended_at, {NOW_SQL})
             WHERE session_id = ?1"
        ),
        [session_id],
    )?;

    if changed == 0 {
        return Err(StoreError::not_found("voice session", session_id));
    }

    get_voice_session(conn, session_id)
}

fn map_row_to_session(row: &Row) -> rusqlite::Result<VoiceSession> {
    let status: String = row.get(2)?;
    let status = status.parse::<SessionStatus>().map_err(|e| conversion_error(2, e))?;

    let language: String = row.get(4)?;
    let language = language.parse::<Language>().map_err(|e| conversion_error(4, e))?;

    let metadata: String = row.get(8)?;
    let metadata = serde_json::from_str(&metadata).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(8, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(VoiceSession {
        session_id: row.get(0)?,
        room_name: row.get(1)?,
        status,
        scenario: row.get(3)?,
        language,
        speech_supported: row.get(5)?,
        started_at: row.get(6)?,
        ended_at: row.get(7)?,
        metadata,
    })
}
