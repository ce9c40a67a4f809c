//! Chat domain types and session assembly

pub mod models;
pub mod session;

pub use models::{ChatMessage, LogEntry, MessageRole};
pub use session::assemble_messages;
