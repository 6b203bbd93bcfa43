//! # Common Error Types
//!
//! Consolidated error handling for the widget messaging core.
//!
//! Errors are categorized by their source:
//!
//! - **[`SendError`]**: Streaming-channel dispatch failures
//! - **[`RequestError`]**: Request-channel (REST) failures
//! - **[`ChatError`]**: Umbrella type for the public client API
//!
//! None of these ever reach the presentation layer as panics or unhandled
//! exceptions: the client converts every transport failure into either a
//! silent fallback or a synthesized error message in the conversation log.

use thiserror::Error;

/// Failure dispatching an envelope on the streaming channel.
#[derive(Debug, Error)]
pub enum SendError {
    /// The WebSocket connection is not currently open. The caller is
    /// expected to fall back to the request channel, not to retry.
    #[error("streaming channel is not open")]
    NotOpen,

    /// The envelope could not be encoded as JSON.
    #[error("failed to encode envelope: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failure on the request (REST) channel.
///
/// The request channel performs no internal retries; one failure surfaces
/// as exactly one synthesized error message in the conversation.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Transport-level failure: connection refused, timeout, DNS error.
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status code.
    #[error("server returned status {status}")]
    Server { status: u16 },

    /// The response body was not the expected JSON shape.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

/// Umbrella error for the public client API.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Send(#[from] SendError),
}

/// Convenience type alias for `Result<T, ChatError>`.
pub type Result<T> = std::result::Result<T, ChatError>;
