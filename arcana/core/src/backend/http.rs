//! HTTP Backend
//!
//! Talks to the reading server over its two endpoints:
//!
//! - `GET /api/cards` returns `{ "success": bool, "cards": [...] }`
//! - `POST /api/interpret-card` answers with a chunked `data: <json>\n` body
//!
//! The streaming body is handed to a spawned [`pump`](crate::stream::pump)
//! task as soon as the response headers arrive.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::ApiConfig;
use crate::deck::Card;
use crate::stream::StreamHandle;

use super::{CatalogResponse, InterpretationBackend, InterpretationRequest};

/// Catalog requests are small; they get a shorter timeout than streams
const CATALOG_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors talking to the reading server
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// The request never got a response
    #[error("request to {url} failed: {source}")]
    Request {
        /// Endpoint that was called
        url: String,
        /// Underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status
    #[error("server returned {status}: {body}")]
    Status {
        /// HTTP status
        status: reqwest::StatusCode,
        /// Response body, for diagnostics
        body: String,
    },

    /// The catalog endpoint reported failure
    #[error("server could not provide the card catalog")]
    CatalogUnavailable,
}

/// Reading server client
#[derive(Clone, Debug)]
pub struct HttpBackend {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpBackend {
    /// Create a client for `base_url` with a request timeout
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Build`] if the TLS backend cannot initialize.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Build)?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        })
    }

    /// Create from the `[api]` config section
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Build`] if the TLS backend cannot initialize.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ClientError> {
        Self::new(config.url.clone(), Duration::from_secs(config.timeout_secs))
    }

    /// Server base URL without a trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn cards_url(&self) -> String {
        format!("{}/api/cards", self.base_url)
    }

    fn interpret_url(&self) -> String {
        format!("{}/api/interpret-card", self.base_url)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Status { status, body })
    }
}

#[async_trait]
impl InterpretationBackend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_cards(&self) -> anyhow::Result<Vec<Card>> {
        let url = self.cards_url();
        let response = self
            .http_client
            .get(&url)
            .timeout(CATALOG_TIMEOUT)
            .send()
            .await
            .map_err(|source| ClientError::Request {
                url: url.clone(),
                source,
            })?;
        let response = Self::check_status(response).await?;

        let catalog: CatalogResponse = response.json().await?;
        if !catalog.success {
            return Err(ClientError::CatalogUnavailable.into());
        }
        debug!(cards = catalog.cards.len(), "Fetched card catalog");
        Ok(catalog.cards)
    }

    async fn interpret(&self, request: &InterpretationRequest) -> anyhow::Result<StreamHandle> {
        let url = self.interpret_url();
        info!(
            card = request.card.id,
            card_index = request.card_index,
            summary = request.is_summary(),
            "Requesting interpretation"
        );

        let response = self
            .http_client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|source| ClientError::Request {
                url: url.clone(),
                source,
            })?;
        let response = Self::check_status(response).await?;

        Ok(StreamHandle::spawn(response.bytes_stream()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let backend = HttpBackend::new("http://localhost:5000/", Duration::from_secs(5)).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:5000");
        assert_eq!(backend.cards_url(), "http://localhost:5000/api/cards");
        assert_eq!(
            backend.interpret_url(),
            "http://localhost:5000/api/interpret-card"
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_request_error() {
        // Port 9 (discard) is essentially never listening
        let backend = HttpBackend::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = backend.fetch_cards().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ClientError>(),
            Some(ClientError::Request { .. })
        ));
    }

    #[tokio::test]
    async fn test_unreachable_server_falls_back_to_standard_deck() {
        let backend = HttpBackend::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let deck = backend.deck_or_standard().await;
        assert_eq!(deck.len(), crate::deck::FULL_DECK_SIZE);
    }
}
