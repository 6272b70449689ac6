//! ChatClient trait implementation for GeminiClient.

use async_trait::async_trait;
use futures_util::StreamExt;
use tracing::debug;

use crate::streaming::decode_response;
use crate::{AiError, ChatClient, ChunkStream, Message};

use super::client::GeminiClient;

#[async_trait]
impl ChatClient for GeminiClient {
    async fn send(&self, messages: &[Message]) -> Result<ChunkStream, AiError> {
        let body = self.build_request_body(messages);
        let url = self.api_url();

        debug!(model = %self.config.model, "Gemini API streaming request");

        let response = self
            .http
            .post(&url)
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AiError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AiError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AiError::Api(format!("HTTP {status}: {text}")));
        }

        let chunks = decode_response(response)
            .into_stream()
            .map(|event| event.and_then(|event| GeminiClient::parse_chunk(&event.data)))
            .boxed();

        Ok(chunks)
    }
}
