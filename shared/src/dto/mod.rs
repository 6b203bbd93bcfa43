//! # Data Transfer Objects (DTOs)
//!
//! All data structures exchanged between the widget client and the
//! conversation backend.
//!
//! ## Module Organization
//!
//! - [`chat`] - Chat envelopes, streaming frames, history, and session DTOs
//!
//! ## Serialization Format
//!
//! All DTOs use `serde_json` for JSON serialization:
//!
//! - **Field naming**: snake_case (default serde behavior)
//! - **Optional fields**: Omitted when `None` using
//!   `#[serde(skip_serializing_if = "Option::is_none")]`
//! - **Streaming frames**: Internally tagged enum on the `"type"` field
//! - **All types**: Implement both `Serialize` and `Deserialize`
//!
//! ## Example JSON Communication
//!
//! ```text
//! POST /api/chat/{session_id}
//! Content-Type: application/json
//!
//! {
//!   "message": "How do I set up my workspace?",
//!   "page_context": { "page_title": "Dashboard", "url": "/dashboard" },
//!   "user_type": "user"
//! }
//! ```
//!
//! ```text
//! HTTP/1.1 200 OK
//! Content-Type: application/json
//!
//! {
//!   "response": "Head to Settings > Workspace to get started.",
//!   "session_id": "7f3b1c9e-...",
//!   "timestamp": "2024-01-01T00:00:00Z"
//! }
//! ```

pub mod chat;

pub use chat::*;
