//! Session struct and transcript bookkeeping.

use std::sync::atomic::AtomicBool;

use chrono::{DateTime, Duration, Utc};

use crate::{Message, Role};

/// A single-user conversation session.
///
/// Holds the append-only transcript and session metadata. Lifecycle is
/// controlled by the hosting application: created on session start,
/// discarded on session end; `reset` starts the session over in place.
pub struct Session {
    /// Transcript, oldest first. Entries are immutable once appended.
    pub(super) transcript: Vec<Message>,
    /// Set once at creation, refreshed only by `reset`.
    pub(super) started_at: DateTime<Utc>,
    /// Completed user submissions (one per user/assistant exchange).
    pub(super) message_count: u64,
    /// Whether the session is currently processing a submission.
    pub(super) busy: AtomicBool,
}

impl Session {
    pub fn new() -> Self {
        Self {
            transcript: Vec::new(),
            started_at: Utc::now(),
            message_count: 0,
            busy: AtomicBool::new(false),
        }
    }

    /// Append a message to the transcript, stamped with the current time.
    ///
    /// Callers reject blank input before reaching this; `text` is expected
    /// to be non-empty after trimming.
    pub fn append(&mut self, role: Role, text: impl Into<String>) {
        self.transcript.push(Message::new(role, text));
    }

    /// Discard the transcript and start the session over. No undo.
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.message_count = 0;
        self.started_at = Utc::now();
    }

    /// Read-only view of the transcript, oldest first.
    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    /// Number of completed user submissions.
    pub fn message_count(&self) -> u64 {
        self.message_count
    }

    /// Number of assistant replies in the transcript.
    pub fn assistant_count(&self) -> usize {
        self.transcript
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .count()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Time elapsed since the session started (or was last reset).
    pub fn elapsed(&self) -> Duration {
        Utc::now() - self.started_at
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
