//! # Transport Channels
//!
//! The two delivery paths to the conversation-responder service:
//!
//! ```text
//! channel/
//! ├── stream.rs   - Persistent WebSocket connection (push-style replies)
//! └── request.rs  - One-shot REST request/response (fallback path)
//! ```
//!
//! Both carry the same [`ChatRequest`](shared::dto::chat::ChatRequest)
//! envelope. Channel selection happens per send inside the client, not
//! here.

pub mod request;
pub mod stream;

use shared::dto::chat::ServerFrame;

/// WebSocket close code signalling intentional shutdown; suppresses any
/// reconnect attempt.
pub const NORMAL_CLOSURE: u16 = 1000;

/// Close code reported when the connection dropped without a close frame
/// (connect failure, read error, or an abruptly severed socket).
pub const ABNORMAL_CLOSURE: u16 = 1006;

/// Connection state of the streaming channel, owned exclusively by the
/// client. Drives per-send channel selection and the visible status
/// indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected, not attempting.
    Disconnected,
    /// Connection attempt in flight.
    Connecting,
    /// Streaming channel is usable for sends.
    Connected,
}

/// Events emitted by a streaming connection into its owner's inbox.
///
/// `Closed` fires exactly once per connection lifetime and is terminal for
/// that instance.
#[derive(Debug)]
pub enum ChannelEvent {
    /// The connection reached the connected state.
    Opened,
    /// One inbound frame from the responder, in arrival order.
    Frame(ServerFrame),
    /// A malformed inbound payload. Does not close the connection.
    ProtocolError(String),
    /// The connection ended. Code [`NORMAL_CLOSURE`] means intentional
    /// shutdown; anything else is abnormal.
    Closed { code: u16, reason: String },
}

pub use request::HttpResponder;
pub use stream::{StreamingChannel, WsStreamFactory};
