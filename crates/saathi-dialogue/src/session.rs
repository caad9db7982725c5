//! Per-conversation turn history.

use saathi_types::{Role, SessionStatus, Turn};
use uuid::Uuid;

use crate::prompt::DRIVER_SUPPORT_PROMPT;

/// Ordered turn history for one conversation.
///
/// `history[0]` is always the system turn built from the session's prompt.
/// It is never removed or reordered, and [`reset`](Self::reset) truncates
/// back to exactly that turn.
///
/// This type validates nothing about the turns it is given. Pairing user and
/// assistant turns and rejecting blank utterances is the orchestrator's job.
#[derive(Debug, Clone)]
pub struct DialogueSession {
    id: Uuid,
    system_prompt: String,
    history: Vec<Turn>,
    status: SessionStatus,
}

impl DialogueSession {
    /// Creates an active session with a fresh id, seeded with `system_prompt`.
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), system_prompt)
    }

    /// Creates an active session under an id assigned by the session store.
    pub fn with_id(id: Uuid, system_prompt: impl Into<String>) -> Self {
        let system_prompt = system_prompt.into();
        Self {
            id,
            history: vec![Turn::system(system_prompt.clone())],
            system_prompt,
            status: SessionStatus::Active,
        }
    }

    /// Creates a session seeded with the built-in driver-support prompt.
    pub fn driver_support() -> Self {
        Self::new(DRIVER_SUPPORT_PROMPT)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    pub fn append_user(&mut self, text: impl Into<String>) {
        self.history.push(Turn::user(text));
    }

    pub fn append_assistant(&mut self, text: impl Into<String>) {
        self.history.push(Turn::assistant(text));
    }

    /// Discards every turn after the system turn. Idempotent.
    ///
    /// The lifecycle status is left untouched: a restarted conversation is
    /// still the same active session.
    pub fn reset(&mut self) {
        self.history.truncate(1);
    }

    /// Drops every turn past the first `len`. The system turn is always kept.
    pub fn truncate_to(&mut self, len: usize) {
        self.history.truncate(len.max(1));
    }

    /// Marks the conversation as closed. The history is kept for inspection.
    pub fn end(&mut self) {
        self.status = SessionStatus::Ended;
    }

    /// Returns an owned copy of the history.
    pub fn snapshot(&self) -> Vec<Turn> {
        self.history.clone()
    }

    /// Borrowed view of the history, for callers that only read.
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Always false: a session holds at least its system turn.
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Most recent turn authored by the driver, if any.
    pub fn last_user_turn(&self) -> Option<&Turn> {
        self.history.iter().rev().find(|turn| turn.role == Role::User)
    }
}
