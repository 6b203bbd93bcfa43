//! # Streaming Channel
//!
//! Maintains one bidirectional WebSocket connection to the conversation
//! responder, scoped to a session identity. `open` never blocks the
//! caller: a spawned task performs the connect handshake and pumps frames,
//! and every outcome surfaces as a [`ChannelEvent`] in the owner's inbox.
//!
//! The connection lifecycle is `idle -> connecting -> connected -> closed`.
//! `Closed` is emitted exactly once per instance; close code 1000 means an
//! intentional shutdown, anything else is abnormal and is the owner's cue
//! to apply its reconnect policy.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use shared::dto::chat::{ChatRequest, ServerFrame};
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async,
    tungstenite::protocol::{frame::coding::CloseCode, CloseFrame},
    tungstenite::Message,
};
use tracing::{debug, trace, warn};

use crate::channel::{ChannelEvent, ABNORMAL_CLOSURE, NORMAL_CLOSURE};
use crate::core::config::ClientConfig;
use crate::core::error::SendError;
use crate::core::service::{StreamFactory, StreamLink};
use crate::session::SessionId;

enum Command {
    Send(String),
    Close { code: u16, reason: String },
}

/// Handle to one streaming connection.
///
/// Dropping the handle closes the connection gracefully with a normal
/// closure code.
pub struct StreamingChannel {
    commands: mpsc::UnboundedSender<Command>,
    connected: Arc<AtomicBool>,
}

impl StreamingChannel {
    /// Initiate a connection for `session`. Returns immediately; progress
    /// is reported through `events`.
    pub fn open(
        config: &ClientConfig,
        session: &SessionId,
        events: mpsc::UnboundedSender<ChannelEvent>,
    ) -> Self {
        let url = config.stream_url(session);
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let connected = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&connected);
        tokio::spawn(async move {
            let (code, reason) = run(url, commands_rx, &events, &flag).await;
            flag.store(false, Ordering::SeqCst);
            // Terminal event, exactly once per connection lifetime.
            let _ = events.send(ChannelEvent::Closed { code, reason });
        });

        Self {
            commands: commands_tx,
            connected,
        }
    }
}

impl StreamLink for StreamingChannel {
    fn send(&self, envelope: &ChatRequest) -> Result<(), SendError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(SendError::NotOpen);
        }
        let text = serde_json::to_string(envelope)?;
        self.commands
            .send(Command::Send(text))
            .map_err(|_| SendError::NotOpen)
    }

    fn close(&self, code: u16, reason: &str) {
        // Idempotent: after the task exits the command queue is closed and
        // further close requests are silently dropped.
        let _ = self.commands.send(Command::Close {
            code,
            reason: reason.to_string(),
        });
    }
}

impl Drop for StreamingChannel {
    fn drop(&mut self) {
        self.close(NORMAL_CLOSURE, "handle dropped");
    }
}

/// Connection task: handshake, then pump outbound commands and inbound
/// frames until either side ends the connection. Returns the close code
/// and reason for the single terminal `Closed` event.
async fn run(
    url: String,
    mut commands: mpsc::UnboundedReceiver<Command>,
    events: &mpsc::UnboundedSender<ChannelEvent>,
    connected: &AtomicBool,
) -> (u16, String) {
    debug!(url = %url, "Connecting to chat stream");

    let ws_stream = match connect_async(&url).await {
        Ok((ws_stream, response)) => {
            debug!(url = %url, status = ?response.status(), "Chat stream connected");
            ws_stream
        }
        Err(e) => {
            warn!(url = %url, error = %e, "Chat stream connect failed");
            return (ABNORMAL_CLOSURE, format!("connect failed: {}", e));
        }
    };

    connected.store(true, Ordering::SeqCst);
    let _ = events.send(ChannelEvent::Opened);

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Send(text)) => {
                    trace!(payload_len = text.len(), "Sending envelope on chat stream");
                    if let Err(e) = write.send(Message::Text(text)).await {
                        warn!(error = %e, "Chat stream write failed");
                        return (ABNORMAL_CLOSURE, format!("write failed: {}", e));
                    }
                }
                Some(Command::Close { code, reason }) => {
                    let frame = CloseFrame {
                        code: CloseCode::from(code),
                        reason: reason.clone().into(),
                    };
                    let _ = write.send(Message::Close(Some(frame))).await;
                    debug!(code = code, reason = %reason, "Chat stream closed by client");
                    return (code, reason);
                }
                // Owner dropped the handle without an explicit close.
                None => {
                    let frame = CloseFrame {
                        code: CloseCode::from(NORMAL_CLOSURE),
                        reason: "handle dropped".into(),
                    };
                    let _ = write.send(Message::Close(Some(frame))).await;
                    return (NORMAL_CLOSURE, "handle dropped".to_string());
                }
            },
            inbound = read.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<ServerFrame>(&text) {
                        Ok(frame) => {
                            let _ = events.send(ChannelEvent::Frame(frame));
                        }
                        Err(e) => {
                            warn!(error = %e, payload_len = text.len(), "Malformed frame on chat stream");
                            let _ = events.send(ChannelEvent::ProtocolError(e.to_string()));
                        }
                    }
                }
                Some(Ok(Message::Ping(data))) => {
                    trace!("Received ping, sending pong");
                    if let Err(e) = write.send(Message::Pong(data)).await {
                        warn!(error = %e, "Failed to send pong");
                        return (ABNORMAL_CLOSURE, format!("pong failed: {}", e));
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    let (code, reason) = frame
                        .map(|f| (u16::from(f.code), f.reason.to_string()))
                        .unwrap_or((ABNORMAL_CLOSURE, String::new()));
                    debug!(code = code, reason = %reason, "Chat stream closed by server");
                    return (code, reason);
                }
                Some(Ok(_)) => {
                    trace!("Ignoring non-text frame on chat stream");
                }
                Some(Err(e)) => {
                    warn!(error = %e, "Chat stream read error");
                    return (ABNORMAL_CLOSURE, format!("read failed: {}", e));
                }
                None => {
                    warn!("Chat stream ended without close frame");
                    return (ABNORMAL_CLOSURE, "connection dropped".to_string());
                }
            },
        }
    }
}

/// Production [`StreamFactory`] backed by [`StreamingChannel`].
pub struct WsStreamFactory {
    config: ClientConfig,
}

impl WsStreamFactory {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }
}

impl StreamFactory for WsStreamFactory {
    fn open(
        &self,
        session: &SessionId,
        events: mpsc::UnboundedSender<ChannelEvent>,
    ) -> Box<dyn StreamLink> {
        Box::new(StreamingChannel::open(&self.config, session, events))
    }
}
