//! Conversation session management.
//!
//! A `Session` holds the transcript (messages) and session metadata, and
//! drives the streaming aggregation loop that turns one user prompt into
//! one assistant reply.

mod chat;
mod export;
mod manager;
mod types;

pub use chat::{ERROR_REPLY, FALLBACK_REPLY};
pub use export::{export_transcript, parse_transcript, ExportError};
pub use manager::Session;
