//! Chat API endpoints
//!
//! `POST /chat/stream` relays a conversation to the completion provider and
//! streams increments back as newline-delimited JSON;
//! `GET /chat/history/:conversation_id` reads the stored log.

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{Json, Response},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::RouterState;
use crate::chat::{ChatMessage, LogEntry};
use crate::error::AppError;

/// Request body for `POST /chat/stream`
#[derive(Debug, Deserialize)]
pub struct ChatStreamRequest {
    /// Prior and new user turns, in caller order
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    /// When true, the configured welcome message is inserted (and logged)
    #[serde(default)]
    pub new_session: bool,
    /// Conversation to continue; a fresh id is generated when absent
    #[serde(default)]
    pub conversation_id: Option<String>,
}

/// POST /chat/stream - Relay a conversation and stream the completion
///
/// The response body is `application/x-ndjson`: one
/// `{"role":"assistant","content":...}` object per provider increment, and
/// on mid-stream failure a single final `{"error":...}` line. Errors before
/// streaming begins (missing configuration, provider rejecting the connect)
/// surface as ordinary JSON error responses instead.
pub async fn chat_stream(
    State((relay, _)): State<RouterState>,
    payload: Result<Json<ChatStreamRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    // Malformed bodies surface through the relay's own error shape
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let conversation_id = request
        .conversation_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let stream = relay
        .stream_chat(conversation_id.clone(), request.messages, request.new_session)
        .await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/x-ndjson")
        .header(header::CACHE_CONTROL, "no-cache")
        .header("x-conversation-id", conversation_id)
        .body(Body::from_stream(stream))
        .map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to build streaming response: {}", e))
        })
}

/// GET /chat/history/:conversation_id - Stored log entries, most recent first
pub async fn conversation_history(
    State((_, store)): State<RouterState>,
    Path(conversation_id): Path<String>,
) -> Result<Json<Vec<LogEntry>>, AppError> {
    let entries = store.query(&conversation_id).await?;
    Ok(Json(entries))
}
