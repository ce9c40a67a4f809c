//! Conversation store
//!
//! Abstract append/query contract over the conversation log, plus the
//! SQLite-backed implementation used in production. The abstraction exists
//! so the relay can be exercised with test doubles.

pub mod db;

use async_trait::async_trait;

use crate::chat::LogEntry;
use crate::error::AppError;

pub use db::ChatLogDb;

/// Append-only persistence of conversation log entries
///
/// `append` is safe to call concurrently for entries belonging to different
/// conversations; within one conversation the relay issues appends
/// sequentially, so implementations only need to respect single-writer call
/// order. Retried appends are not deduplicated - a retry after a timeout may
/// produce duplicate entries with distinct ids.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Persist one log entry
    ///
    /// # Errors
    /// Returns `AppError::Storage` on transient or permanent write failure.
    /// A single attempt is made; retries are the caller's decision.
    async fn append(&self, entry: &LogEntry) -> Result<(), AppError>;

    /// Fetch all entries for a conversation, most recent first
    ///
    /// # Errors
    /// Returns `AppError::Storage` if the read fails.
    async fn query(&self, conversation_id: &str) -> Result<Vec<LogEntry>, AppError>;
}
