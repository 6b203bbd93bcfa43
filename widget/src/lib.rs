//! # Aiden Chat Widget - Messaging Core
//!
//! Session-scoped dual-channel messaging client for the Aiden onboarding
//! assistant. The widget talks to the conversation backend over a
//! persistent WebSocket and falls back transparently to a REST
//! request/response call whenever the stream is unavailable.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                 ChatClient (client.rs)               │
//! │   per-send channel selection, reconnect w/ fixed     │
//! │   delay, composing indicator, error synthesis        │
//! │                                                      │
//! │  ┌──────────────────┐      ┌──────────────────────┐  │
//! │  │ StreamingChannel │      │    HttpResponder     │  │
//! │  │ (channel/stream) │      │  (channel/request)   │  │
//! │  └────────┬─────────┘      └──────────┬───────────┘  │
//! └───────────┼───────────────────────────┼──────────────┘
//!             │ WebSocket                 │ HTTP/JSON
//!             ▼                           ▼
//!        /api/ws/{session}          /api/chat/{session}
//! ```
//!
//! ## Core Concepts
//!
//! - **Session identity**: one opaque token ([`SessionId`]) correlates all
//!   traffic on both transports to one conversation.
//! - **Conversation store**: [`Conversation`] is the ordered, append-only
//!   log the presentation layer renders from. For every user message
//!   exactly one assistant reply or one synthesized error message is
//!   eventually appended.
//! - **Observer contract**: the client pushes [`ChatEvent`]s over an
//!   `async-channel` sender; the embedder re-reads the store on change.
//!   The core never depends on any UI reactivity model.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use widget::{ChatClient, ClientConfig};
//!
//! # async fn example() {
//! let (events_tx, events_rx) = async_channel::unbounded();
//! let client = ChatClient::new(ClientConfig::from_env(), events_tx);
//!
//! client.open();
//! client.send("How do I invite my team?", None).await;
//!
//! while let Ok(event) = events_rx.recv().await {
//!     // re-render from client.conversation()
//! }
//! # }
//! ```

pub mod channel;
pub mod client;
pub mod core;
pub mod session;
pub mod store;

// Re-export commonly used types for convenience
pub use channel::{ConnectionState, HttpResponder, StreamingChannel, WsStreamFactory};
pub use client::{ChatClient, ChatEvent, FALLBACK_REPLY};
pub use crate::core::{
    ChatError, ClientConfig, RequestError, ResponderApi, Result, SendError, StreamFactory,
    StreamLink,
};
pub use session::SessionId;
pub use store::{ChatMessage, Conversation, Sender};
