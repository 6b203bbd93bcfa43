//! # Shared Data Transfer Objects Library
//!
//! This library defines the wire contract between the chat widget client and
//! the conversation backend. All DTOs use JSON serialization via `serde` and
//! carry the same logical payload on both transports (WebSocket and REST).
//!
//! ## Structure
//!
//! - **[`dto`]**: Data Transfer Objects for chat communication
//!   - **[`dto::chat`]**: Chat envelopes, streaming frames, and session DTOs
//!
//! ## Wire Format
//!
//! - Field names use **snake_case** in Rust, which maps to snake_case in JSON
//! - Optional fields are omitted from JSON when `None`
//! - Streaming frames are internally tagged on a `"type"` field
//! - Timestamps travel as RFC 3339 strings
//!
//! ## Usage in the Client
//!
//! ```rust
//! use shared::dto::chat::ChatRequest;
//!
//! let request = ChatRequest {
//!     message: "How do I invite my team?".to_string(),
//!     page_context: None,
//!     user_type: "user".to_string(),
//! };
//!
//! let json = serde_json::to_string(&request).unwrap();
//! assert!(json.contains("\"message\""));
//! ```

pub mod dto;

// Re-export commonly used types for convenience
// Note: Wildcard re-exports are used here since shared is a DTO library
// where all exports are meant to be public API
pub use dto::*;
