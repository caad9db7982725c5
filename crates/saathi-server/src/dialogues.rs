//! Live dialogue state, keyed by persisted session id.

use saathi_dialogue::{DialogueSession, ReplySource};
use saathi_types::{SpeechStatus, TechnicalStatus};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;

/// One conversation's in-memory state.
///
/// The dialogue sits behind an async mutex held for a whole turn, so a
/// session never runs two turns at once.
#[derive(Debug)]
pub struct LiveDialogue {
    dialogue: Mutex<DialogueSession>,
    speech_supported: bool,
}

impl LiveDialogue {
    pub fn new(dialogue: DialogueSession, speech_supported: bool) -> Self {
        Self {
            dialogue: Mutex::new(dialogue),
            speech_supported,
        }
    }

    pub fn dialogue(&self) -> &Mutex<DialogueSession> {
        &self.dialogue
    }

    pub fn speech_supported(&self) -> bool {
        self.speech_supported
    }

    /// Builds the status snapshot for a turn that took `latency_ms`.
    pub fn technical_status(&self, source: &ReplySource, latency_ms: u64) -> TechnicalStatus {
        let speech = SpeechStatus::from_supported(self.speech_supported);
        TechnicalStatus {
            provider_status: source.provider_status(),
            speech_in_status: speech,
            speech_out_status: speech,
            latency_ms,
        }
    }
}

/// Registry of live dialogues.
///
/// Uses `std::sync::RwLock`: every acquisition is a short map operation that
/// never spans an `.await`.
#[derive(Debug, Clone, Default)]
pub struct DialogueRegistry {
    sessions: Arc<RwLock<HashMap<String, Arc<LiveDialogue>>>>,
}

impl DialogueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `live` under `session_id`, replacing any previous entry.
    pub fn insert(&self, session_id: impl Into<String>, live: LiveDialogue) -> Arc<LiveDialogue> {
        let live = Arc::new(live);
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        sessions.insert(session_id.into(), live.clone());
        live
    }

    /// Returns the entry for `session_id`, inserting the one built by `init`
    /// if none exists yet.
    pub fn get_or_insert_with(
        &self,
        session_id: &str,
        init: impl FnOnce() -> LiveDialogue,
    ) -> Arc<LiveDialogue> {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(init()))
            .clone()
    }

    pub fn get(&self, session_id: &str) -> Option<Arc<LiveDialogue>> {
        self.sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(session_id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
