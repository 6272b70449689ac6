//! The response aggregation loop (one submission -> one reply).

use futures_util::StreamExt;
use tracing::warn;

use crate::{AiError, ChatClient, Message, Role};

use super::manager::Session;
use super::types::BusyGuard;

/// Substituted when the stream produced no usable text.
pub const FALLBACK_REPLY: &str = "Sorry, I couldn't generate a response. Please try again.";

/// Substituted when the streaming call itself could not be opened.
pub const ERROR_REPLY: &str = "I encountered an error. Please try again later.";

impl Session {
    /// Submit one user prompt and aggregate the streamed reply.
    ///
    /// Appends the user message, drives the client's chunk stream to
    /// completion (invoking `on_chunk` for each piece of text as it
    /// arrives), and appends exactly one assistant message. A chunk that
    /// fails to decode is skipped; only a failure to open the stream at all
    /// degrades the whole reply, and then to a fixed notice rather than an
    /// error. Either way the user's message stays in the transcript.
    ///
    /// Whitespace-only input is rejected up front: nothing is appended and
    /// the client is never called.
    pub async fn chat_streaming(
        &mut self,
        client: &dyn ChatClient,
        user_text: &str,
        on_chunk: impl Fn(&str),
    ) -> Result<String, AiError> {
        let prompt = user_text.trim();
        if prompt.is_empty() {
            return Err(AiError::EmptyPrompt);
        }

        let _guard = BusyGuard::acquire(&self.busy)?;

        self.transcript.push(Message::new(Role::User, prompt));

        let reply = match client.send(&self.transcript).await {
            Ok(stream) => aggregate(stream, &on_chunk).await,
            Err(e) => {
                warn!("Failed to open response stream: {e}");
                ERROR_REPLY.to_string()
            }
        };

        self.transcript.push(Message::new(Role::Assistant, reply.clone()));
        self.message_count += 1;
        Ok(reply)
    }
}

/// Concatenate chunk text in delivery order, skipping chunks that fail.
async fn aggregate(mut stream: crate::ChunkStream, on_chunk: &impl Fn(&str)) -> String {
    let mut full_response = String::new();

    while let Some(item) = stream.next().await {
        match item {
            Ok(chunk) => {
                if let Some(text) = chunk.text {
                    if !text.is_empty() {
                        on_chunk(&text);
                        full_response.push_str(&text);
                    }
                }
            }
            Err(e) => warn!("Skipped a chunk: {e}"),
        }
    }

    if full_response.is_empty() {
        FALLBACK_REPLY.to_string()
    } else {
        full_response
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use futures_util::StreamExt;

    use crate::{AiError, ChatClient, ChunkStream, Message, Role, StreamChunk};

    use super::*;

    /// Client that replays a scripted chunk sequence and counts calls.
    struct ScriptedClient {
        script: Vec<Result<Option<&'static str>, &'static str>>,
        calls: AtomicUsize,
        fail_open: bool,
    }

    impl ScriptedClient {
        fn streaming(script: Vec<Result<Option<&'static str>, &'static str>>) -> Self {
            Self {
                script,
                calls: AtomicUsize::new(0),
                fail_open: false,
            }
        }

        fn failing_open() -> Self {
            Self {
                script: Vec::new(),
                calls: AtomicUsize::new(0),
                fail_open: true,
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChatClient for ScriptedClient {
        async fn send(&self, _messages: &[Message]) -> Result<ChunkStream, AiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_open {
                return Err(AiError::Network("connection refused".into()));
            }
            let items: Vec<Result<StreamChunk, AiError>> = self
                .script
                .iter()
                .map(|entry| match *entry {
                    Ok(text) => Ok(StreamChunk {
                        text: text.map(str::to_string),
                    }),
                    Err(msg) => Err(AiError::Parse(msg.to_string())),
                })
                .collect();
            Ok(futures_util::stream::iter(items).boxed())
        }
    }

    #[tokio::test]
    async fn erroring_chunk_is_skipped_not_substituted() {
        let client = ScriptedClient::streaming(vec![
            Ok(Some("Hel")),
            Ok(Some("lo")),
            Err("bad chunk"),
            Ok(Some(" world")),
        ]);
        let mut session = Session::new();

        let reply = session
            .chat_streaming(&client, "greet me", |_| {})
            .await
            .unwrap();

        assert_eq!(reply, "Hello world");
        assert_eq!(session.transcript()[1].text, "Hello world");
    }

    #[tokio::test]
    async fn empty_stream_yields_fallback() {
        let client = ScriptedClient::streaming(vec![]);
        let mut session = Session::new();

        let reply = session.chat_streaming(&client, "hi", |_| {}).await.unwrap();
        assert_eq!(reply, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn all_erroring_chunks_yield_fallback() {
        let client = ScriptedClient::streaming(vec![Err("a"), Err("b"), Err("c")]);
        let mut session = Session::new();

        let reply = session.chat_streaming(&client, "hi", |_| {}).await.unwrap();
        assert_eq!(reply, FALLBACK_REPLY);
        assert_ne!(reply, "");
    }

    #[tokio::test]
    async fn textless_chunks_do_not_contribute() {
        let client =
            ScriptedClient::streaming(vec![Ok(None), Ok(Some("ok")), Ok(None)]);
        let mut session = Session::new();

        let reply = session.chat_streaming(&client, "hi", |_| {}).await.unwrap();
        assert_eq!(reply, "ok");
    }

    #[tokio::test]
    async fn stream_open_failure_appends_notice_and_keeps_user_message() {
        let client = ScriptedClient::failing_open();
        let mut session = Session::new();

        let reply = session
            .chat_streaming(&client, "hello?", |_| {})
            .await
            .unwrap();

        assert_eq!(reply, ERROR_REPLY);
        let transcript = session.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].role, Role::User);
        assert_eq!(transcript[0].text, "hello?");
        assert_eq!(transcript[1].role, Role::Assistant);
        assert_eq!(transcript[1].text, ERROR_REPLY);
    }

    #[tokio::test]
    async fn n_submissions_give_2n_entries_and_count_n() {
        let client = ScriptedClient::streaming(vec![Ok(Some("reply"))]);
        let mut session = Session::new();

        for i in 0..5 {
            session
                .chat_streaming(&client, &format!("question {i}"), |_| {})
                .await
                .unwrap();
        }

        assert_eq!(session.transcript().len(), 10);
        assert_eq!(session.message_count(), 5);
        assert_eq!(session.assistant_count(), 5);
    }

    #[tokio::test]
    async fn blank_input_never_appends_or_calls_client() {
        let client = ScriptedClient::streaming(vec![Ok(Some("unused"))]);
        let mut session = Session::new();

        for input in ["", "   ", "\t\n "] {
            let err = session.chat_streaming(&client, input, |_| {}).await;
            assert!(matches!(err, Err(AiError::EmptyPrompt)));
        }

        assert!(session.transcript().is_empty());
        assert_eq!(session.message_count(), 0);
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn input_is_trimmed_before_recording() {
        let client = ScriptedClient::streaming(vec![Ok(Some("hi"))]);
        let mut session = Session::new();

        session
            .chat_streaming(&client, "  question  \n", |_| {})
            .await
            .unwrap();

        assert_eq!(session.transcript()[0].text, "question");
    }

    #[tokio::test]
    async fn on_chunk_sees_each_piece_in_order() {
        let client =
            ScriptedClient::streaming(vec![Ok(Some("a")), Err("skip"), Ok(Some("b"))]);
        let mut session = Session::new();

        let seen = std::sync::Mutex::new(Vec::new());
        session
            .chat_streaming(&client, "go", |piece| {
                seen.lock().unwrap().push(piece.to_string());
            })
            .await
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["a", "b"]);
    }
}
