//! Interpretation Backend Trait
//!
//! The seam between surfaces and the reading server. Surfaces hold an
//! `Arc<dyn InterpretationBackend>` and never talk HTTP themselves, which
//! lets tests substitute an in-memory backend that replays canned streams.

use async_trait::async_trait;

use crate::deck::{Card, Deck};
use crate::stream::{LiveSession, StreamHandle};

use super::InterpretationRequest;

/// A source of card catalogs and interpretation streams
#[async_trait]
pub trait InterpretationBackend: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &str;

    /// Fetch the card catalog
    async fn fetch_cards(&self) -> anyhow::Result<Vec<Card>>;

    /// Start streaming an interpretation
    ///
    /// An `Err` means no stream was opened at all. Failures after the stream
    /// opens arrive through the handle as `StreamUpdate::Failed`.
    async fn interpret(&self, request: &InterpretationRequest) -> anyhow::Result<StreamHandle>;

    /// Fetch the catalog, falling back to the built-in deck
    async fn deck_or_standard(&self) -> Deck {
        match self.fetch_cards().await {
            Ok(cards) if !cards.is_empty() => match Deck::new(cards) {
                Ok(deck) => deck,
                Err(e) => {
                    tracing::warn!(backend = self.name(), error = %e, "Invalid catalog, using built-in deck");
                    Deck::standard()
                }
            },
            Ok(_) => {
                tracing::warn!(backend = self.name(), "Empty catalog, using built-in deck");
                Deck::standard()
            }
            Err(e) => {
                tracing::warn!(backend = self.name(), error = %e, "Catalog unavailable, using built-in deck");
                Deck::standard()
            }
        }
    }

    /// Start a request and wrap it for watching
    ///
    /// A request that fails to open becomes a finished session with the
    /// failure shown inline.
    async fn open_session(&self, request: &InterpretationRequest) -> LiveSession {
        match self.interpret(request).await {
            Ok(handle) => LiveSession::new(handle),
            Err(e) => {
                tracing::warn!(backend = self.name(), error = %e, "Interpretation request failed");
                LiveSession::failed(format!("{e:#}"))
            }
        }
    }
}
