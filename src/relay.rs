//! Streaming relay
//!
//! Per-request orchestration: assemble the prompt, mirror it to the
//! conversation log, open the completion stream, and forward each partial
//! to the client while appending it to the log. Emission comes before
//! persistence - user-perceived latency is never gated on storage I/O, and
//! a failing store degrades observability only, never the chat itself.

use std::pin::Pin;
use std::sync::Arc;

use futures_util::stream::Stream;
use futures_util::StreamExt;
use tracing::{error, info, warn};

use crate::chat::{assemble_messages, ChatMessage, LogEntry, MessageRole};
use crate::completion::{CompletionClient, StreamEvent};
use crate::config::ChatConfig;
use crate::error::AppError;
use crate::store::ConversationStore;

/// Newline-delimited JSON lines destined for the HTTP response body
///
/// Items are always `Ok`; stream-level failures are encoded in-band as a
/// final `{"error": ...}` line so the client can distinguish a clean end
/// from a mid-stream failure.
pub type RelayStream = Pin<Box<dyn Stream<Item = Result<String, std::io::Error>> + Send>>;

/// Orchestrates one chat request from prompt assembly to stream close
///
/// Dependencies are injected at construction and shared across requests;
/// they are read-only after initialization, so concurrent requests run
/// fully independently.
pub struct StreamingRelay {
    client: Arc<dyn CompletionClient>,
    store: Arc<dyn ConversationStore>,
    chat: ChatConfig,
}

impl StreamingRelay {
    /// Create a relay around the given completion client and store
    pub fn new(
        client: Arc<dyn CompletionClient>,
        store: Arc<dyn ConversationStore>,
        chat: ChatConfig,
    ) -> Self {
        Self {
            client,
            store,
            chat,
        }
    }

    /// Handle one chat request, returning the NDJSON response stream
    ///
    /// Every prompt message (persona, welcome when present, caller turns) is
    /// appended to the conversation log before the completion stream opens;
    /// assistant partials are appended as they arrive, after being emitted.
    ///
    /// # Errors
    /// Fails before any output is produced if the completion client rejects
    /// the call (`AppError::Configuration` or `AppError::Upstream`). Once
    /// the stream has started, all failures are delivered in-band.
    pub async fn stream_chat(
        &self,
        conversation_id: String,
        request_messages: Vec<ChatMessage>,
        new_session: bool,
    ) -> Result<RelayStream, AppError> {
        let all_messages = assemble_messages(&self.chat, &request_messages, new_session);

        info!(
            conversation_id = %conversation_id,
            new_session = new_session,
            message_count = all_messages.len(),
            "Relaying chat request"
        );

        // Mirror the full prompt to the log before the first assistant
        // partial. An unavailable store must not block chat availability.
        for message in &all_messages {
            self.log_message(&conversation_id, message).await;
        }

        // Call-time failures abort the request before streaming begins
        let mut upstream = self.client.stream_chat(all_messages).await?;

        let store = self.store.clone();
        let stream = async_stream::stream! {
            // If the client disconnects, axum drops this generator, which
            // drops `upstream` and releases the provider connection.
            while let Some(event) = upstream.next().await {
                match event {
                    StreamEvent::Content(content) => {
                        yield Ok::<_, std::io::Error>(render_content_line(&content));

                        let entry =
                            LogEntry::new(conversation_id.clone(), MessageRole::Assistant, content);
                        if let Err(e) = store.append(&entry).await {
                            warn!(
                                conversation_id = %conversation_id,
                                error = %e,
                                "Failed to append assistant partial; stream continues"
                            );
                        }
                    }
                    StreamEvent::Error(reason) => {
                        error!(
                            conversation_id = %conversation_id,
                            error = %reason,
                            "Completion stream failed; terminating with in-band error"
                        );
                        yield Ok::<_, std::io::Error>(render_error_line(&reason));
                        // Exactly one error line, nothing after it
                        return;
                    }
                }
            }

            info!(conversation_id = %conversation_id, "Completion stream drained");
        };

        Ok(Box::pin(stream))
    }

    /// Append one prompt message to the conversation log, swallowing failures
    async fn log_message(&self, conversation_id: &str, message: &ChatMessage) {
        let entry = LogEntry::new(conversation_id, message.role, message.content.clone());
        if let Err(e) = self.store.append(&entry).await {
            warn!(
                conversation_id = %conversation_id,
                role = message.role.as_str(),
                error = %e,
                "Failed to append prompt message; proceeding without it"
            );
        }
    }
}

/// Render one assistant increment as an NDJSON line
fn render_content_line(content: &str) -> String {
    let mut line = serde_json::json!({"role": "assistant", "content": content}).to_string();
    line.push('\n');
    line
}

/// Render the terminal in-band error as an NDJSON line
fn render_error_line(reason: &str) -> String {
    let mut line = serde_json::json!({"error": reason}).to_string();
    line.push('\n');
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_line_is_single_line_json() {
        let line = render_content_line("¡Hola!");
        assert_eq!(line, "{\"role\":\"assistant\",\"content\":\"¡Hola!\"}\n");
    }

    #[test]
    fn error_line_carries_the_reason() {
        let line = render_error_line("quota exhausted");
        let parsed: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(parsed["error"], "quota exhausted");
    }

    #[test]
    fn embedded_newlines_stay_escaped() {
        // NDJSON framing depends on content newlines being escaped
        let line = render_content_line("línea 1\nlínea 2");
        assert_eq!(line.matches('\n').count(), 1);
        assert!(line.ends_with('\n'));
    }
}
