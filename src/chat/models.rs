//! Chat data models
//!
//! Defines the wire-level message structure and the persisted log entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Persona/system instruction message
    System,
    /// Message from the assistant/AI
    Assistant,
    /// Message from the user
    User,
}

impl MessageRole {
    /// Convert the role to its string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::Assistant => "assistant",
            MessageRole::User => "user",
        }
    }
}

impl From<&str> for MessageRole {
    fn from(s: &str) -> Self {
        match s {
            "system" => MessageRole::System,
            "assistant" => MessageRole::Assistant,
            _ => MessageRole::User,
        }
    }
}

/// A single message as sent to (and received from) the completion provider
///
/// This is also the shape of the `messages` array in the `/chat/stream`
/// request body. Content is passed through unvalidated; the provider's own
/// contract governs rejection of malformed input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the sender
    pub role: MessageRole,
    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// Create a message with the given role and content
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// A persisted record of a single message
///
/// Created once at write time, never mutated or deleted by this component.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LogEntry {
    /// Unique identifier, assigned at write time
    pub id: String,
    /// ID of the conversation this entry belongs to (partition key)
    pub conversation_id: String,
    /// Role of the message sender ("system", "assistant" or "user")
    pub role: String,
    /// Content of the message
    pub content: String,
    /// Capture time (Unix milliseconds); monotonic within one conversation
    /// because the relay is the single sequential writer
    pub timestamp: i64,
}

impl LogEntry {
    /// Create a new log entry for a conversation, stamped with the current time
    pub fn new(conversation_id: impl Into<String>, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            conversation_id: conversation_id.into(),
            role: role.as_str().to_string(),
            content: content.into(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// Get the message role as enum
    pub fn role_enum(&self) -> MessageRole {
        MessageRole::from(self.role.as_str())
    }

    /// Get the capture time as DateTime
    #[allow(dead_code)]
    pub fn timestamp_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp).unwrap_or_else(Utc::now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        for role in [MessageRole::System, MessageRole::Assistant, MessageRole::User] {
            assert_eq!(MessageRole::from(role.as_str()), role);
        }
    }

    #[test]
    fn chat_message_serializes_with_lowercase_role() {
        let msg = ChatMessage::new(MessageRole::Assistant, "hola");
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hola"}"#);
    }

    #[test]
    fn log_entry_copies_role_and_content() {
        let entry = LogEntry::new("conv-1", MessageRole::User, "¿Qué tal?");
        assert_eq!(entry.conversation_id, "conv-1");
        assert_eq!(entry.role, "user");
        assert_eq!(entry.content, "¿Qué tal?");
        assert_eq!(entry.role_enum(), MessageRole::User);
        assert!(!entry.id.is_empty());
    }
}
