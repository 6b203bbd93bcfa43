//! # Request Channel
//!
//! One-shot REST fallback used whenever the streaming channel is not
//! connected. Each send is a single `POST` carrying the same envelope the
//! streaming channel would carry; the reply comes back in the same call.
//! No retries happen here: a single failure surfaces to the client as one
//! synthesized error message.

use async_trait::async_trait;
use reqwest::Client;
use shared::dto::chat::{
    ChatRequest, ChatResponse, ClearSessionResponse, HealthResponse, HistoryResponse,
};
use tracing::{debug, error, warn};

use crate::core::config::ClientConfig;
use crate::core::error::RequestError;
use crate::core::service::ResponderApi;
use crate::session::SessionId;

/// HTTP client for the conversation-responder REST endpoints.
///
/// The client is configured with a 10 second timeout so a hung backend can
/// never freeze the widget.
pub struct HttpResponder {
    client: Client,
    config: ClientConfig,
}

impl HttpResponder {
    pub fn new(config: ClientConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, config }
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, RequestError> {
        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Responder returned error status");
            return Err(RequestError::Server {
                status: status.as_u16(),
            });
        }
        response.json::<T>().await.map_err(|e| {
            error!(error = %e, "Failed to parse responder payload");
            RequestError::Decode(e.to_string())
        })
    }
}

#[async_trait]
impl ResponderApi for HttpResponder {
    #[tracing::instrument(skip(self, request), fields(session = %session))]
    async fn chat(
        &self,
        session: &SessionId,
        request: &ChatRequest,
    ) -> Result<ChatResponse, RequestError> {
        let start = std::time::Instant::now();

        let response = self
            .client
            .post(self.config.chat_url(session))
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Chat request network error");
                RequestError::Network(e.to_string())
            })?;

        let result = Self::decode::<ChatResponse>(response).await;
        if result.is_ok() {
            debug!(
                duration_ms = start.elapsed().as_millis() as u64,
                "Chat request completed"
            );
        }
        result
    }

    async fn history(&self, session: &SessionId) -> Result<HistoryResponse, RequestError> {
        let response = self
            .client
            .get(self.config.history_url(session))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "History request network error");
                RequestError::Network(e.to_string())
            })?;

        Self::decode(response).await
    }

    async fn clear_session(
        &self,
        session: &SessionId,
    ) -> Result<ClearSessionResponse, RequestError> {
        let response = self
            .client
            .delete(self.config.session_url(session))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Clear-session request network error");
                RequestError::Network(e.to_string())
            })?;

        Self::decode(response).await
    }

    async fn health(&self) -> Result<HealthResponse, RequestError> {
        let response = self
            .client
            .get(self.config.health_url())
            .send()
            .await
            .map_err(|e| RequestError::Network(e.to_string()))?;

        Self::decode(response).await
    }
}
