//! Chat engine for qachat.
//!
//! Provides a Gemini API client with:
//! - Streaming (SSE) support
//! - Session management with an append-only transcript
//! - Chunk-tolerant response aggregation
//! - Transcript export in a line-oriented text format

pub mod gemini;
pub mod session;
pub mod streaming;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::stream::BoxStream;

pub use gemini::{GeminiClient, GeminiConfig};
pub use session::Session;

/// One incremental unit of text delivered during response generation.
/// Transient; never stored in the transcript.
#[derive(Debug, Clone, Default)]
pub struct StreamChunk {
    pub text: Option<String>,
}

/// The stream of chunks produced by one generation call.
///
/// A per-item `Err` means that single chunk could not be retrieved and may
/// be skipped; failing to open the stream at all is signalled by the outer
/// `Result` of [`ChatClient::send`].
pub type ChunkStream = BoxStream<'static, Result<StreamChunk, AiError>>;

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Start one streaming generation over the given conversation.
    ///
    /// The last message is expected to be the user's current prompt; earlier
    /// messages are prior context, oldest first.
    async fn send(&self, messages: &[Message]) -> Result<ChunkStream, AiError>;
}

/// One entry in the transcript. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            _ => Err(()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Empty prompt")]
    EmptyPrompt,
}
