//! # Chat Client
//!
//! The decision and recovery logic binding the two transports into one
//! logical conversation link.
//!
//! ## Channel Selection
//!
//! Evaluated per send, not per connection: when the streaming channel is
//! connected the envelope goes out on it and the reply arrives as a pushed
//! frame; otherwise the envelope goes out on the request channel and the
//! reply comes back in the same call. A session may use both transports
//! across its lifetime.
//!
//! ## Reconnect Policy
//!
//! An abnormal closure while the widget surface is active schedules exactly
//! one reconnect attempt after a fixed 3 second delay. The loop repeats for
//! as long as the surface stays open and closures stay abnormal; there is
//! no backoff growth and no attempt cap. A normal closure (code 1000) never
//! schedules a reconnect.
//!
//! ## Failure Surface
//!
//! Every failure terminates here. The presentation layer only ever sees an
//! appended error message and a connection-status change; diagnostics go to
//! `tracing`.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use shared::dto::chat::{ChatRequest, HistoryResponse, ServerFrame};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::channel::{ChannelEvent, ConnectionState, HttpResponder, WsStreamFactory, NORMAL_CLOSURE};
use crate::core::config::ClientConfig;
use crate::core::error::{Result, SendError};
use crate::core::service::{ResponderApi, StreamFactory, StreamLink};
use crate::session::SessionId;
use crate::store::{ChatMessage, Conversation};

/// Fixed user-facing text appended when a reply cannot be obtained. The
/// underlying diagnostic is logged, never shown.
pub const FALLBACK_REPLY: &str =
    "I'm having trouble responding right now. Please try again in a moment.";

/// Fixed delay between an abnormal closure and the next connect attempt.
const RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// Notifications pushed to the presentation layer.
///
/// The core never assumes UI reactivity; whoever embeds the client listens
/// on the channel handed to [`ChatClient::new`] and re-reads
/// [`ChatClient::conversation`] on change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// The conversation store changed; re-render from it.
    ConversationUpdated,
    /// The streaming-channel connection state changed.
    ConnectionChanged(ConnectionState),
    /// Whether a reply is currently awaited.
    Composing(bool),
}

struct Inner {
    config: ClientConfig,
    responder: Arc<dyn ResponderApi>,
    streams: Arc<dyn StreamFactory>,
    session: RwLock<SessionId>,
    conversation: Arc<Conversation>,
    state: RwLock<ConnectionState>,
    /// Number of user messages still awaiting a reply. The streaming path
    /// returns from `send` immediately, so several can be outstanding at
    /// once; each reply or error frame settles exactly one.
    pending: AtomicUsize,
    /// Whether the widget surface is open. Gates reconnect scheduling.
    active: AtomicBool,
    /// Bumped on teardown and session reset; in-flight work from an older
    /// generation discards its result instead of touching the store.
    generation: AtomicU64,
    stream: Mutex<Option<Box<dyn StreamLink>>>,
    reconnect: Mutex<Option<JoinHandle<()>>>,
    pump: Mutex<Option<JoinHandle<()>>>,
    events: async_channel::Sender<ChatEvent>,
}

impl Inner {
    fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    fn set_state(&self, next: ConnectionState) {
        let changed = {
            let mut state = self.state.write();
            let changed = *state != next;
            *state = next;
            changed
        };
        if changed {
            self.notify(ChatEvent::ConnectionChanged(next));
        }
    }

    /// One more reply is now awaited; the composing indicator turns on
    /// with the first.
    fn begin_reply(&self) {
        if self.pending.fetch_add(1, Ordering::SeqCst) == 0 {
            self.notify(ChatEvent::Composing(true));
        }
    }

    /// Settle one awaited reply. Returns `false` when nothing was awaited,
    /// so callers can tell a solicited reply from an unsolicited one. The
    /// composing indicator turns off with the last.
    fn finish_reply(&self) -> bool {
        let mut current = self.pending.load(Ordering::SeqCst);
        loop {
            if current == 0 {
                return false;
            }
            match self.pending.compare_exchange(
                current,
                current - 1,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => {
                    if current == 1 {
                        self.notify(ChatEvent::Composing(false));
                    }
                    return true;
                }
                Err(actual) => current = actual,
            }
        }
    }

    /// Drop all awaited replies on teardown or reset.
    fn clear_pending(&self) {
        if self.pending.swap(0, Ordering::SeqCst) > 0 {
            self.notify(ChatEvent::Composing(false));
        }
    }

    /// A slow or dropped receiver must never wedge the messaging core, so
    /// notifications are fire-and-forget.
    fn notify(&self, event: ChatEvent) {
        if self.events.try_send(event).is_err() {
            tracing::trace!("Dropping UI notification, receiver unavailable");
        }
    }

    /// Append the fixed error reply for one awaited response. No-op when
    /// nothing is awaited, which keeps the store balanced at one reply or
    /// one error per user message.
    fn synthesize_error_reply(&self) {
        if !self.finish_reply() {
            return;
        }
        self.conversation.append(ChatMessage::assistant(FALLBACK_REPLY));
        self.notify(ChatEvent::ConversationUpdated);
    }
}

/// Open a fresh streaming connection and spawn the pump that routes its
/// events. Replaces the previous connection wholesale.
fn connect(inner: &Arc<Inner>) {
    if !inner.active.load(Ordering::SeqCst) {
        return;
    }
    inner.set_state(ConnectionState::Connecting);

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let session = inner.session.read().clone();
    let link = inner.streams.open(&session, events_tx);
    *inner.stream.lock() = Some(link);

    let generation = inner.generation.load(Ordering::SeqCst);
    let pump_inner = Arc::clone(inner);
    let pump = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            // Stale connection after teardown or reset.
            if pump_inner.generation.load(Ordering::SeqCst) != generation {
                break;
            }
            match event {
                ChannelEvent::Opened => {
                    info!("Chat stream connected");
                    pump_inner.set_state(ConnectionState::Connected);
                }
                ChannelEvent::Frame(ServerFrame::Message { content, .. }) => {
                    pump_inner.finish_reply();
                    pump_inner.conversation.append(ChatMessage::assistant(content));
                    pump_inner.notify(ChatEvent::ConversationUpdated);
                }
                ChannelEvent::Frame(ServerFrame::Error { content }) => {
                    warn!(content = %content, "Responder reported an error frame");
                    pump_inner.synthesize_error_reply();
                }
                ChannelEvent::ProtocolError(reason) => {
                    warn!(reason = %reason, "Malformed inbound payload");
                    pump_inner.synthesize_error_reply();
                }
                ChannelEvent::Closed { code, reason } => {
                    info!(code, reason = %reason, "Chat stream closed");
                    pump_inner.set_state(ConnectionState::Disconnected);
                    if code != NORMAL_CLOSURE && pump_inner.active.load(Ordering::SeqCst) {
                        schedule_reconnect(&pump_inner);
                    }
                    break;
                }
            }
        }
    });
    if let Some(old) = inner.pump.lock().replace(pump) {
        old.abort();
    }
}

/// Schedule exactly one reconnect attempt after the fixed delay.
fn schedule_reconnect(inner: &Arc<Inner>) {
    debug!(
        delay_secs = RECONNECT_DELAY.as_secs(),
        "Scheduling chat stream reconnect"
    );
    let timer_inner = Arc::clone(inner);
    let handle = tokio::spawn(async move {
        tokio::time::sleep(RECONNECT_DELAY).await;
        if timer_inner.active.load(Ordering::SeqCst) {
            connect(&timer_inner);
        }
    });
    // At most one pending timer at a time.
    if let Some(old) = inner.reconnect.lock().replace(handle) {
        old.abort();
    }
}

/// Session-scoped dual-channel chat client.
///
/// Owns the single active streaming connection and the connection state;
/// nothing else mutates either. Cheap to clone (shared inner).
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<Inner>,
}

impl ChatClient {
    /// Build a client with the production transports (WebSocket streaming
    /// plus REST fallback). Notifications go out on `events`.
    pub fn new(config: ClientConfig, events: async_channel::Sender<ChatEvent>) -> Self {
        let responder = Arc::new(HttpResponder::new(config.clone()));
        let streams = Arc::new(WsStreamFactory::new(config.clone()));
        Self::with_transports(config, responder, streams, events)
    }

    /// Build a client with injected transports. Used by tests and by
    /// embedders that bring their own network stack.
    pub fn with_transports(
        config: ClientConfig,
        responder: Arc<dyn ResponderApi>,
        streams: Arc<dyn StreamFactory>,
        events: async_channel::Sender<ChatEvent>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                responder,
                streams,
                session: RwLock::new(SessionId::new()),
                conversation: Arc::new(Conversation::new()),
                state: RwLock::new(ConnectionState::Disconnected),
                pending: AtomicUsize::new(0),
                active: AtomicBool::new(false),
                generation: AtomicU64::new(0),
                stream: Mutex::new(None),
                reconnect: Mutex::new(None),
                pump: Mutex::new(None),
                events,
            }),
        }
    }

    /// The widget surface became active: attempt the streaming connection
    /// once. Idempotent while already open.
    pub fn open(&self) {
        if self.inner.active.swap(true, Ordering::SeqCst) {
            return;
        }
        info!(session = %self.inner.session.read(), "Opening chat surface");
        connect(&self.inner);
    }

    /// The widget surface became inactive: cancel any pending reconnect,
    /// close the streaming channel with a normal code so no reconnect
    /// fires, and arrange for in-flight request replies to be discarded.
    pub fn close(&self) {
        if !self.inner.active.swap(false, Ordering::SeqCst) {
            return;
        }
        info!("Closing chat surface");
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(timer) = self.inner.reconnect.lock().take() {
            timer.abort();
        }
        if let Some(link) = self.inner.stream.lock().take() {
            link.close(NORMAL_CLOSURE, "widget closed");
        }
        if let Some(pump) = self.inner.pump.lock().take() {
            pump.abort();
        }
        self.inner.clear_pending();
        self.inner.set_state(ConnectionState::Disconnected);
    }

    /// Send one user message.
    ///
    /// The user message is appended synchronously; the reply (or the fixed
    /// error message) is appended when it arrives. Returns immediately when
    /// the streaming channel carries the envelope, awaits the HTTP exchange
    /// on the fallback path.
    pub async fn send(&self, text: impl Into<String>, page_context: Option<Value>) {
        let text = text.into();
        if text.trim().is_empty() {
            return;
        }
        self.inner.conversation.append(ChatMessage::user(text.clone()));
        self.inner.notify(ChatEvent::ConversationUpdated);
        self.inner.begin_reply();

        let envelope = ChatRequest {
            message: text,
            page_context,
            user_type: self.inner.config.user_type.clone(),
        };

        // Channel selection happens here, per message.
        if self.inner.state() == ConnectionState::Connected {
            let dispatched = {
                let stream = self.inner.stream.lock();
                match stream.as_deref() {
                    Some(link) => link.send(&envelope),
                    None => Err(SendError::NotOpen),
                }
            };
            match dispatched {
                Ok(()) => {
                    debug!("Envelope dispatched on streaming channel");
                    return;
                }
                Err(e) => {
                    // Lost the race with a disconnect; fall through silently.
                    debug!(error = %e, "Streaming send failed, using request channel");
                }
            }
        }

        self.send_via_request(envelope).await;
    }

    async fn send_via_request(&self, envelope: ChatRequest) {
        let generation = self.inner.generation.load(Ordering::SeqCst);
        let session = self.inner.session.read().clone();
        match self.inner.responder.chat(&session, &envelope).await {
            Ok(reply) => {
                if self.inner.generation.load(Ordering::SeqCst) != generation {
                    debug!("Discarding reply for a torn-down session");
                    return;
                }
                self.inner.finish_reply();
                self.inner
                    .conversation
                    .append(ChatMessage::assistant(reply.response));
                self.inner.notify(ChatEvent::ConversationUpdated);
            }
            Err(e) => {
                error!(error = %e, "Request channel send failed");
                if self.inner.generation.load(Ordering::SeqCst) != generation {
                    return;
                }
                self.inner.synthesize_error_reply();
            }
        }
    }

    /// Start a fresh conversation: best-effort remote clear, wholesale
    /// store replacement, new session identity, and a new streaming
    /// connection when the surface is active.
    pub async fn reset(&self) {
        let session = self.inner.session.read().clone();
        if let Err(e) = self.inner.responder.clear_session(&session).await {
            warn!(error = %e, "Remote session clear failed");
        }
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.conversation.reset();
        *self.inner.session.write() = SessionId::new();
        self.inner.clear_pending();
        self.inner.notify(ChatEvent::ConversationUpdated);

        if self.inner.active.load(Ordering::SeqCst) {
            if let Some(timer) = self.inner.reconnect.lock().take() {
                timer.abort();
            }
            if let Some(link) = self.inner.stream.lock().take() {
                link.close(NORMAL_CLOSURE, "session reset");
            }
            connect(&self.inner);
        }
    }

    /// Server-side history for the current session.
    pub async fn history(&self) -> Result<HistoryResponse> {
        let session = self.inner.session.read().clone();
        Ok(self.inner.responder.history(&session).await?)
    }

    /// The conversation log the presentation layer renders from.
    pub fn conversation(&self) -> Arc<Conversation> {
        Arc::clone(&self.inner.conversation)
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.inner.state()
    }

    pub fn is_composing(&self) -> bool {
        self.inner.pending.load(Ordering::SeqCst) > 0
    }

    pub fn session_id(&self) -> SessionId {
        self.inner.session.read().clone()
    }
}
