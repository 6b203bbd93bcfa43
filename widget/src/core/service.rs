//! # Service Traits
//!
//! Abstractions over the two transports so the client logic can be tested
//! with mock implementations injected in place of the real network.

use async_trait::async_trait;
use shared::dto::chat::{ChatRequest, ChatResponse, ClearSessionResponse, HealthResponse, HistoryResponse};
use tokio::sync::mpsc;

use crate::channel::ChannelEvent;
use crate::core::error::{RequestError, SendError};
use crate::session::SessionId;

/// Request-channel operations against the conversation-responder service.
///
/// Implemented by [`crate::channel::request::HttpResponder`] for production
/// and by mocks in tests.
#[async_trait]
pub trait ResponderApi: Send + Sync {
    /// Deliver one envelope and obtain one reply in the same call.
    async fn chat(
        &self,
        session: &SessionId,
        request: &ChatRequest,
    ) -> std::result::Result<ChatResponse, RequestError>;

    /// Fetch the server-side conversation history for a session.
    async fn history(&self, session: &SessionId)
        -> std::result::Result<HistoryResponse, RequestError>;

    /// Delete the server-side session record.
    async fn clear_session(
        &self,
        session: &SessionId,
    ) -> std::result::Result<ClearSessionResponse, RequestError>;

    /// Backend health probe.
    async fn health(&self) -> std::result::Result<HealthResponse, RequestError>;
}

/// Handle to one live (or connecting) streaming connection.
///
/// Results of `send` surface later as [`ChannelEvent`]s; the handle itself
/// never blocks.
pub trait StreamLink: Send + Sync {
    /// Dispatch one envelope. Fails with [`SendError::NotOpen`] when the
    /// connection has not reached the connected state.
    fn send(&self, envelope: &ChatRequest) -> std::result::Result<(), SendError>;

    /// Graceful shutdown with an explicit close code. Idempotent.
    fn close(&self, code: u16, reason: &str);
}

/// Opens streaming connections scoped to a session.
///
/// Each call produces a fresh connection whose events flow into the
/// provided inbox. The previous connection, if any, is replaced wholesale.
pub trait StreamFactory: Send + Sync {
    fn open(
        &self,
        session: &SessionId,
        events: mpsc::UnboundedSender<ChannelEvent>,
    ) -> Box<dyn StreamLink>;
}
