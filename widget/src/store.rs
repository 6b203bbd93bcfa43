//! # Conversation Store
//!
//! Ordered, append-only in-memory log of the current session's messages.
//! This is the single source of truth the presentation layer renders from;
//! it is never reordered and never trimmed mid-session. All mutation is
//! serialized behind a `parking_lot` RwLock since WebSocket callbacks,
//! request-channel completions, and reconnect timers are independent
//! asynchronous sources.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Assistant,
}

/// One immutable entry in the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Assistant,
            timestamp: Utc::now(),
        }
    }
}

/// Append-only message log for one session.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: RwLock<Vec<ChatMessage>>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one message. Insertion order is conversation order.
    pub fn append(&self, message: ChatMessage) {
        self.messages.write().push(message);
    }

    /// Ordered snapshot of the conversation for rendering.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.messages.read().clone()
    }

    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.read().is_empty()
    }

    /// Wholesale replacement on session reset. The only way messages ever
    /// leave the store.
    pub fn reset(&self) {
        self.messages.write().clear();
    }
}
