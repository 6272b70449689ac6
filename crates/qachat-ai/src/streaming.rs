//! Server-Sent Events (SSE) streaming decoder.
//!
//! The Generative Language API streams responses as SSE when asked with
//! `?alt=sse`. This module provides a pull-based decoder over any buffered
//! line source, plus adapters for reqwest responses, so the event semantics
//! can be tested without a network.

use futures_util::StreamExt;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio_util::io::StreamReader;

use crate::AiError;

/// A single SSE event parsed from the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// The event type, when the server sent an `event:` field.
    pub event: Option<String>,
    /// The event data (JSON string for the Gemini API).
    pub data: String,
}

/// Incremental SSE decoder over a buffered line source.
pub struct SseDecoder<R> {
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin> SseDecoder<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    /// Read lines until one full event has been assembled.
    ///
    /// `event:` and `data:` fields accumulate; an empty line dispatches the
    /// pending event; multiple `data:` lines are joined with `\n`; other
    /// fields (`id:`, `retry:`, comments) are ignored. A trailing event
    /// without a terminating blank line is flushed at end of stream.
    pub async fn next_event(&mut self) -> Option<Result<SseEvent, AiError>> {
        let mut current_event: Option<String> = None;
        let mut current_data = String::new();

        loop {
            let line = match self.lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    if current_data.is_empty() {
                        return None;
                    }
                    return Some(Ok(SseEvent {
                        event: current_event,
                        data: current_data,
                    }));
                }
                Err(e) => return Some(Err(AiError::Network(e.to_string()))),
            };

            if line.is_empty() {
                // Empty line = end of event
                if !current_data.is_empty() {
                    return Some(Ok(SseEvent {
                        event: current_event,
                        data: current_data,
                    }));
                }
                current_event = None;
                continue;
            }

            if let Some(event_type) = line.strip_prefix("event: ") {
                current_event = Some(event_type.to_string());
            } else if let Some(data) = line.strip_prefix("data: ") {
                if !current_data.is_empty() {
                    current_data.push('\n');
                }
                current_data.push_str(data);
            }
        }
    }
}

impl<R: AsyncBufRead + Unpin + Send + 'static> SseDecoder<R> {
    /// Adapt the decoder into a stream of events.
    pub fn into_stream(self) -> futures_util::stream::BoxStream<'static, Result<SseEvent, AiError>> {
        futures_util::stream::unfold(self, |mut decoder| async move {
            decoder.next_event().await.map(|event| (event, decoder))
        })
        .boxed()
    }
}

/// Build an SSE decoder over a reqwest response body.
pub fn decode_response(
    response: reqwest::Response,
) -> SseDecoder<impl AsyncBufRead + Unpin + Send + 'static> {
    let byte_stream = response
        .bytes_stream()
        .map(|result| result.map_err(std::io::Error::other))
        .boxed();
    SseDecoder::new(tokio::io::BufReader::new(StreamReader::new(byte_stream)))
}
