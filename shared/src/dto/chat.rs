//! # Chat Data Transfer Objects
//!
//! Defines the transport-agnostic chat envelope plus the frame and response
//! types for both transports. The same [`ChatRequest`] body is sent whether
//! the widget is on the WebSocket channel or the REST fallback.

use serde::{Deserialize, Serialize};

/// Outbound chat envelope, identical on both transports.
///
/// `page_context` is an opaque JSON object supplied by the embedding page
/// (page title, URL, visible features); the client never inspects it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_context: Option<serde_json::Value>,
    pub user_type: String,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, page_context: Option<serde_json::Value>) -> Self {
        Self {
            message: message.into(),
            page_context,
            user_type: "user".to_string(),
        }
    }
}

/// Reply from the REST chat endpoint (`POST /api/chat/{session_id}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: String,
    pub timestamp: String,
}

/// Inbound frame on the streaming channel.
///
/// The backend tags frames with a `"type"` field: assistant replies arrive
/// as `{"type":"message","content":...,"timestamp":...}` and responder-side
/// failures as `{"type":"error","content":...}` (no timestamp).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerFrame {
    Message { content: String, timestamp: String },
    Error { content: String },
}

/// One entry of a stored conversation as returned by the history endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: String,
    pub content: String,
    pub timestamp: String,
}

/// Reply from `GET /api/session/{session_id}/history`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub history: Vec<HistoryEntry>,
}

/// Reply from `DELETE /api/session/{session_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearSessionResponse {
    pub message: String,
}

/// Reply from `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}
