//! Completion client
//!
//! Wraps a single outbound streaming call to the completion provider behind
//! an object-safe trait, so the relay can be driven by test doubles. Errors
//! mid-stream are delivered as data (the terminal item of the sequence),
//! not as exceptional control flow past already-yielded items.

pub mod azure;
pub mod credentials;
pub mod types;

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::stream::Stream;

use crate::chat::ChatMessage;
use crate::error::AppError;

pub use azure::AzureOpenAiClient;
pub use credentials::{Credential, StaticApiKey, StaticBearerToken, TokenProvider};

/// One unit of incremental output from the completion provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Incremental assistant text
    Content(String),
    /// Terminal failure; no further events follow this one
    Error(String),
}

/// A finite, single-consumer sequence of stream events
///
/// Not restartable: replaying requires a fresh `stream_chat` call, which
/// opens a new upstream stream.
pub type CompletionStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send>>;

/// A streaming chat-completion call
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Open one streaming completion request for the given prompt
    ///
    /// # Errors
    /// * `AppError::Configuration` if required endpoint/deployment settings
    ///   are absent (a startup-time condition, surfaced before streaming)
    /// * `AppError::Upstream` if the provider rejects the request at connect
    ///   time. Mid-stream failures arrive as `StreamEvent::Error` instead.
    async fn stream_chat(&self, messages: Vec<ChatMessage>) -> Result<CompletionStream, AppError>;
}
