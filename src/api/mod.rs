//! API module
//!
//! Contains HTTP request handlers for the chat relay endpoints

pub mod chat;

use std::sync::Arc;

use crate::relay::StreamingRelay;
use crate::store::ConversationStore;

/// Shared handler state: the relay plus the store for history reads
///
/// Both handles are built once at startup and never reassigned.
pub type RouterState = (Arc<StreamingRelay>, Arc<dyn ConversationStore>);
