//! Conversation message records.

use rusqlite::{params, Connection, OptionalExtension, Row};
use saathi_types::Speaker;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{conversion_error, StoreError};
use crate::NOW_SQL;

/// A persisted conversation message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMessage {
    pub message_id: String,
    pub session_id: String,
    pub speaker: Speaker,
    pub content: String,
    /// Devanagari rendering, when the client supplies one.
    pub content_hindi: Option<String>,
    /// RFC 3339 UTC timestamp.
    pub timestamp: String,
    pub audio_url: Option<String>,
    pub processing_time_ms: Option<u64>,
    pub metadata: Value,
}

impl ConversationMessage {
    /// Text shown in transcripts: the Hindi rendering when present.
    pub fn display_text(&self) -> &str {
        self.content_hindi
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&self.content)
    }
}

/// Parameters for recording a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub session_id: String,
    pub speaker: Speaker,
    pub content: String,
    #[serde(default)]
    pub content_hindi: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub processing_time_ms: Option<u64>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

impl NewMessage {
    pub fn new(session_id: impl Into<String>, speaker: Speaker, content: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            speaker,
            content: content.into(),
            content_hindi: None,
            audio_url: None,
            processing_time_ms: None,
            metadata: None,
        }
    }

    pub fn with_processing_time(mut self, ms: u64) -> Self {
        self.processing_time_ms = Some(ms);
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

const MESSAGE_COLUMNS: &str = "message_id, session_id, speaker, content, content_hindi, \
     timestamp, audio_url, processing_time_ms, metadata";

/// Records a message against an existing session.
///
/// Fails with [`StoreError::NotFound`] when the session does not exist.
pub fn create_message(
    conn: &Connection,
    new: &NewMessage,
) -> Result<ConversationMessage, StoreError> {
    let session_exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM voice_sessions WHERE session_id = ?1",
        [&new.session_id],
        |row| row.get(0),
    )?;
    if !session_exists {
        return Err(StoreError::not_found("voice session", &new.session_id));
    }

    let message_id = uuid::Uuid::new_v4().to_string();
    let metadata = match &new.metadata {
        Some(value) => serde_json::to_string(value)?,
        None => "{}".to_string(),
    };
    let processing_time = new
        .processing_time_ms
        .map(|ms| i64::try_from(ms).unwrap_or(i64::MAX));

    let sql = format!(
        "INSERT INTO conversation_messages (
            message_id, session_id, speaker, content, content_hindi,
            timestamp, audio_url, processing_time_ms, metadata
        ) VALUES (?1, ?2, ?3, ?4, ?5, {NOW_SQL}, ?6, ?7, ?8)
        RETURNING {MESSAGE_COLUMNS}"
    );

    let message = conn.query_row(
        &sql,
        params![
            message_id,
            new.session_id,
            new.speaker.as_str(),
            new.content,
            new.content_hindi,
            new.audio_url,
            processing_time,
            metadata,
        ],
        map_row_to_message,
    )?;

    Ok(message)
}

/// Records a driver utterance and the reply to it in one transaction.
///
/// Either both messages are stored or neither is.
pub fn record_exchange(
    conn: &Connection,
    utterance: &NewMessage,
    reply: &NewMessage,
) -> Result<(ConversationMessage, ConversationMessage), StoreError> {
    let tx = conn.unchecked_transaction()?;
    let utterance = create_message(&tx, utterance)?;
    let reply = create_message(&tx, reply)?;
    tx.commit()?;
    Ok((utterance, reply))
}

/// Lists a session's messages in the order they were recorded.
pub fn list_session_messages(
    conn: &Connection,
    session_id: &str,
) -> Result<Vec<ConversationMessage>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MESSAGE_COLUMNS} FROM conversation_messages
         WHERE session_id = ?1 ORDER BY id ASC"
    ))?;

    let rows = stmt.query_map([session_id], map_row_to_message)?;
    let mut messages = Vec::new();
    for row in rows {
        messages.push(row?);
    }
    Ok(messages)
}

/// Retrieves one message by its public ID.
pub fn get_message(conn: &Connection, message_id: &str) -> Result<ConversationMessage, StoreError> {
    conn.query_row(
        &format!("SELECT {MESSAGE_COLUMNS} FROM conversation_messages WHERE message_id = ?1"),
        [message_id],
        map_row_to_message,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found("message", message_id))
}

fn map_row_to_message(row: &Row) -> rusqlite::Result<ConversationMessage> {
    let speaker: String = row.get(2)?;
    let speaker = speaker.parse::<Speaker>().map_err(|e| conversion_error(2, e))?;

    let processing_time: Option<i64> = row.get(7)?;

    let metadata: String = row.get(8)?;
    let metadata = serde_json::from_str(&metadata).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(8, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(ConversationMessage {
        message_id: row.get(0)?,
        session_id: row.get(1)?,
        speaker,
        content: row.get(3)?,
        content_hindi: row.get(4)?,
        timestamp: row.get(5)?,
        audio_url: row.get(6)?,
        processing_time_ms: processing_time.map(|ms| ms.max(0) as u64),
        metadata,
    })
}
