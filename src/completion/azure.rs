//! Azure OpenAI streaming client
//!
//! Direct HTTP client for the chat-completions endpoint with `stream: true`.
//! Each `stream_chat` call opens one upstream SSE stream; provider failures
//! after the stream has started are converted into a terminal
//! `StreamEvent::Error` item rather than raised past already-yielded events.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use tracing::{debug, warn};

use crate::chat::ChatMessage;
use crate::completion::credentials::{Credential, TokenProvider};
use crate::completion::types::{ChatCompletionChunk, ChatCompletionRequest, ProviderErrorBody};
use crate::completion::{CompletionClient, CompletionStream, StreamEvent};
use crate::config::OpenAiConfig;
use crate::error::AppError;

/// Streaming client for an Azure OpenAI chat deployment
pub struct AzureOpenAiClient {
    client: reqwest::Client,
    config: OpenAiConfig,
    tokens: Arc<dyn TokenProvider>,
}

/// Outcome of parsing one SSE line
#[derive(Debug, PartialEq, Eq)]
enum SseLine {
    /// Incremental assistant text
    Delta(String),
    /// End-of-stream marker (`data: [DONE]`)
    Done,
    /// Keep-alive, role-only chunk, or anything else to ignore
    Skip,
}

impl AzureOpenAiClient {
    /// Create a client for the configured deployment
    ///
    /// # Errors
    /// Returns `AppError::Configuration` if the endpoint or deployment name
    /// is empty. This is checked here so a misconfigured process fails at
    /// startup rather than on the first request.
    pub fn new(
        client: reqwest::Client,
        config: OpenAiConfig,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, AppError> {
        if config.endpoint.trim().is_empty() {
            return Err(AppError::Configuration(
                "Azure OpenAI endpoint is required".to_string(),
            ));
        }
        if config.deployment.trim().is_empty() {
            return Err(AppError::Configuration(
                "Azure OpenAI chat deployment is required".to_string(),
            ));
        }
        Ok(Self {
            client,
            config,
            tokens,
        })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.deployment,
            self.config.api_version
        )
    }
}

#[async_trait]
impl CompletionClient for AzureOpenAiClient {
    async fn stream_chat(&self, messages: Vec<ChatMessage>) -> Result<CompletionStream, AppError> {
        let url = self.completions_url();
        let request_body = ChatCompletionRequest {
            messages,
            stream: true,
        };

        debug!(
            url = %url,
            deployment = %self.config.deployment,
            message_count = request_body.messages.len(),
            "Opening streaming completion request"
        );

        let mut request = self.client.post(&url).json(&request_body);
        request = match self.tokens.credential().await? {
            Credential::ApiKey(key) => request.header("api-key", key),
            Credential::Bearer(token) => request.bearer_auth(token),
        };

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to reach completion endpoint: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());

            let detail = serde_json::from_str::<ProviderErrorBody>(&error_body)
                .map(|body| body.error.message)
                .unwrap_or(error_body);

            return Err(AppError::Upstream(format!(
                "Completion endpoint returned status {}: {}",
                status.as_u16(),
                detail
            )));
        }

        let mut bytes = response.bytes_stream();
        let stream = async_stream::stream! {
            // Buffered as bytes so multi-byte UTF-8 sequences split across
            // network chunks are only decoded once a full line is present
            let mut buffer: Vec<u8> = Vec::new();
            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        // Mid-stream transport failure terminates the
                        // sequence with an in-band error item
                        yield StreamEvent::Error(format!("Provider stream failed: {}", e));
                        return;
                    }
                };

                buffer.extend_from_slice(&chunk);
                while let Some(newline) = buffer.iter().position(|&b| b == b'\n') {
                    let line: Vec<u8> = buffer.drain(..=newline).collect();
                    let line = String::from_utf8_lossy(&line);
                    match parse_sse_line(line.trim()) {
                        SseLine::Delta(content) => yield StreamEvent::Content(content),
                        SseLine::Done => return,
                        SseLine::Skip => {}
                    }
                }
            }

            // The provider may close the connection without terminating the
            // final line; flush whatever remains in the buffer
            if !buffer.is_empty() {
                let line = String::from_utf8_lossy(&buffer);
                if let SseLine::Delta(content) = parse_sse_line(line.trim()) {
                    yield StreamEvent::Content(content);
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

/// Parse a single line of the provider's SSE body
fn parse_sse_line(line: &str) -> SseLine {
    let Some(data) = line.strip_prefix("data:") else {
        // Blank separator lines, comments, and event fields
        return SseLine::Skip;
    };
    let data = data.trim();

    if data == "[DONE]" {
        return SseLine::Done;
    }

    match serde_json::from_str::<ChatCompletionChunk>(data) {
        Ok(chunk) => {
            let content = chunk
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.delta.content);
            match content {
                Some(text) if !text.is_empty() => SseLine::Delta(text),
                // Role-only first chunk, finish chunk, or content-filter
                // chunk with no choices
                _ => SseLine::Skip,
            }
        }
        Err(e) => {
            warn!(error = %e, "Skipping unparseable completion chunk");
            SseLine::Skip
        }
    }
}
