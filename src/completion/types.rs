//! Azure OpenAI wire types
//!
//! Structs that mirror the chat-completions request body and the streamed
//! response chunk format (`"stream": true`). Only the fields this service
//! reads are modeled.

use serde::{Deserialize, Serialize};

use crate::chat::ChatMessage;

/// Request body for a streaming chat completion
#[derive(Serialize, Debug)]
pub struct ChatCompletionRequest {
    /// Full assembled prompt, persona first
    pub messages: Vec<ChatMessage>,
    /// Always true; this client only does streaming calls
    pub stream: bool,
}

/// One server-sent chunk of a streaming chat completion
#[derive(Deserialize, Debug)]
pub struct ChatCompletionChunk {
    /// Candidate deltas; Azure content-filter chunks may carry none
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

/// A single choice inside a streamed chunk
#[derive(Deserialize, Debug)]
pub struct ChunkChoice {
    /// The incremental payload
    #[serde(default)]
    pub delta: ChunkDelta,
    /// Why the model stopped, present on the final content chunk
    #[serde(default)]
    #[allow(dead_code)] // Part of the wire format, not acted on
    pub finish_reason: Option<String>,
}

/// Incremental message payload of one chunk
#[derive(Deserialize, Debug, Default)]
pub struct ChunkDelta {
    /// Role marker, only present on the first chunk of a stream
    #[serde(default)]
    #[allow(dead_code)] // Part of the wire format, not acted on
    pub role: Option<String>,
    /// Incremental text; absent on role-only and finish chunks
    #[serde(default)]
    pub content: Option<String>,
}

/// Error body returned by the provider on a failed request
#[derive(Deserialize, Debug)]
pub struct ProviderErrorBody {
    /// The error detail
    pub error: ProviderErrorDetail,
}

/// Error detail inside a provider error body
#[derive(Deserialize, Debug)]
pub struct ProviderErrorDetail {
    /// Human-readable message
    #[serde(default)]
    pub message: String,
    /// Provider error code (e.g. "429", "content_filter")
    #[serde(default)]
    pub code: Option<String>,
}
