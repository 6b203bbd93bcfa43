//! # Client Configuration
//!
//! Base service address and endpoint builders. The backend exposes both
//! transports under one base URL; the streaming endpoint is derived by
//! translating the HTTP scheme to the equivalent WebSocket scheme.

use crate::session::SessionId;

/// Default backend address when `API_BASE_URL` is not set.
const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Configuration consumed by the messaging core.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base service address, e.g. `http://localhost:5000`.
    pub base_url: String,
    /// User type forwarded in every envelope so the responder can tailor
    /// replies (`"user"`, `"admin"`, ...).
    pub user_type: String,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: trim_trailing_slash(base_url.into()),
            user_type: "user".to_string(),
        }
    }

    /// Read the base URL from the `API_BASE_URL` environment variable,
    /// falling back to the localhost default.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    pub fn with_user_type(mut self, user_type: impl Into<String>) -> Self {
        self.user_type = user_type.into();
        self
    }

    /// Session-scoped WebSocket endpoint (`ws://.../api/ws/{session_id}`).
    pub fn stream_url(&self, session: &SessionId) -> String {
        let ws_base = self
            .base_url
            .replace("https://", "wss://")
            .replace("http://", "ws://");
        format!("{}/api/ws/{}", ws_base, session)
    }

    /// Session-scoped REST chat endpoint (`POST /api/chat/{session_id}`).
    pub fn chat_url(&self, session: &SessionId) -> String {
        format!("{}/api/chat/{}", self.base_url, session)
    }

    /// Session history endpoint (`GET /api/session/{session_id}/history`).
    pub fn history_url(&self, session: &SessionId) -> String {
        format!("{}/api/session/{}/history", self.base_url, session)
    }

    /// Session resource endpoint (`DELETE /api/session/{session_id}`).
    pub fn session_url(&self, session: &SessionId) -> String {
        format!("{}/api/session/{}", self.base_url, session)
    }

    /// Backend health endpoint (`GET /api/health`).
    pub fn health_url(&self) -> String {
        format!("{}/api/health", self.base_url)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

fn trim_trailing_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}
