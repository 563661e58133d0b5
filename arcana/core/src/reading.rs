//! Reading Flow
//!
//! Walks a finished spread card by card. Each card is revealed, its
//! interpretation streams in, and only once that stream has finished may the
//! reading move on. After the last card the closing summary can be requested.
//!
//! ```text
//! card 0: reveal → streaming → finished ─ advance ─→ card 1: ... → card N-1
//!                                                                    │
//!                                                       finished ─ summary
//! ```
//!
//! Starting a session always drops the previous one for the same slot, which
//! aborts its network task.

use thiserror::Error;
use tracing::info;

use crate::backend::{Category, InterpretationBackend, InterpretationRequest};
use crate::selection::{SelectedCard, Selection, SpreadPosition};
use crate::stream::LiveSession;

/// Why a reading step was refused
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ReadingError {
    /// A reading needs at least one card
    #[error("no cards to read")]
    Empty,
    /// The current card was already revealed
    #[error("card {0} is already revealed")]
    AlreadyRevealed(usize),
    /// The current card has not been revealed yet
    #[error("card {0} has not been revealed")]
    NotRevealed(usize),
    /// The current interpretation is still streaming
    #[error("interpretation is still streaming")]
    Streaming,
    /// There is no card after the current one
    #[error("already at the last card")]
    LastCard,
    /// The summary is only available after the last card
    #[error("summary requires the last card's interpretation to finish")]
    SummaryNotReady,
}

/// A reading over a fixed spread
#[derive(Debug)]
pub struct Reading {
    cards: Vec<SelectedCard>,
    category: Option<Category>,
    situation: String,
    current: usize,
    revealed: bool,
    interpretation: Option<LiveSession>,
    summary: Option<LiveSession>,
}

impl Reading {
    /// Start a reading over `cards` in spread order
    ///
    /// # Errors
    ///
    /// Returns [`ReadingError::Empty`] if `cards` is empty.
    pub fn new(
        cards: Vec<SelectedCard>,
        category: Option<Category>,
        situation: impl Into<String>,
    ) -> Result<Self, ReadingError> {
        if cards.is_empty() {
            return Err(ReadingError::Empty);
        }
        Ok(Self {
            cards,
            category,
            situation: situation.into(),
            current: 0,
            revealed: false,
            interpretation: None,
            summary: None,
        })
    }

    /// Start a reading over a selection
    ///
    /// # Errors
    ///
    /// Returns [`ReadingError::Empty`] if nothing was selected.
    pub fn from_selection(
        selection: &Selection,
        category: Option<Category>,
        situation: impl Into<String>,
    ) -> Result<Self, ReadingError> {
        Self::new(selection.as_slice().to_vec(), category, situation)
    }

    /// Cards in spread order
    #[must_use]
    pub fn cards(&self) -> &[SelectedCard] {
        &self.cards
    }

    /// Index of the card being read
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The card being read
    #[must_use]
    pub fn current_card(&self) -> &SelectedCard {
        // `cards` is non-empty and `current` never passes the last index
        &self.cards[self.current]
    }

    /// Spread position of the card being read
    #[must_use]
    pub fn position(&self) -> Option<SpreadPosition> {
        SpreadPosition::from_index(self.current)
    }

    /// Whether the current card is the last one
    #[must_use]
    pub fn is_last_card(&self) -> bool {
        self.current + 1 == self.cards.len()
    }

    /// Whether the current card has been revealed
    #[must_use]
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Whether the current card's interpretation has finished
    #[must_use]
    pub fn interpretation_finished(&self) -> bool {
        self.interpretation
            .as_ref()
            .is_some_and(LiveSession::is_finished)
    }

    /// Whether [`Reading::advance`] would succeed
    #[must_use]
    pub fn can_advance(&self) -> bool {
        !self.is_last_card() && self.interpretation_finished()
    }

    /// Whether [`Reading::begin_summary`] would succeed
    #[must_use]
    pub fn can_request_summary(&self) -> bool {
        self.is_last_card() && self.interpretation_finished()
    }

    /// Request body for the current card
    #[must_use]
    pub fn card_request(&self) -> InterpretationRequest {
        let card = self.current_card();
        InterpretationRequest {
            card: card.into(),
            card_index: self.current,
            category: self.category.clone().unwrap_or_default(),
            situation: self.situation.clone(),
            all_cards: self.cards.iter().map(Into::into).collect(),
        }
    }

    /// Request body for the closing summary
    #[must_use]
    pub fn summary_request(&self) -> Option<InterpretationRequest> {
        InterpretationRequest::final_summary(&self.cards, self.category.as_ref(), &self.situation)
    }

    /// Mark the current card revealed and return its request
    ///
    /// The caller opens the session and hands it back through
    /// [`Reading::attach_interpretation`].
    ///
    /// # Errors
    ///
    /// Returns [`ReadingError::AlreadyRevealed`] on a second reveal.
    pub fn begin_reveal(&mut self) -> Result<InterpretationRequest, ReadingError> {
        if self.revealed {
            return Err(ReadingError::AlreadyRevealed(self.current));
        }
        self.revealed = true;
        self.interpretation = None;
        Ok(self.card_request())
    }

    /// Install the session for the current card, dropping any previous one
    pub fn attach_interpretation(&mut self, session: LiveSession) {
        self.interpretation = Some(session);
    }

    /// Reveal the current card and start its interpretation
    ///
    /// # Errors
    ///
    /// Returns [`ReadingError::AlreadyRevealed`] on a second reveal.
    pub async fn reveal<B>(&mut self, backend: &B) -> Result<(), ReadingError>
    where
        B: InterpretationBackend + ?Sized,
    {
        let request = self.begin_reveal()?;
        info!(card_index = self.current, card = request.card.id, "Revealing card");
        let session = backend.open_session(&request).await;
        self.attach_interpretation(session);
        Ok(())
    }

    /// Move to the next card
    ///
    /// # Errors
    ///
    /// [`ReadingError::NotRevealed`] before the reveal,
    /// [`ReadingError::Streaming`] while the interpretation is still running,
    /// [`ReadingError::LastCard`] at the end of the spread.
    pub fn advance(&mut self) -> Result<usize, ReadingError> {
        if !self.revealed {
            return Err(ReadingError::NotRevealed(self.current));
        }
        if !self.interpretation_finished() {
            return Err(ReadingError::Streaming);
        }
        if self.is_last_card() {
            return Err(ReadingError::LastCard);
        }
        self.current += 1;
        self.revealed = false;
        self.interpretation = None;
        Ok(self.current)
    }

    /// Check the summary may start and return its request
    ///
    /// # Errors
    ///
    /// Returns [`ReadingError::SummaryNotReady`] before the last card's
    /// interpretation has finished.
    pub fn begin_summary(&mut self) -> Result<InterpretationRequest, ReadingError> {
        if !self.can_request_summary() {
            return Err(ReadingError::SummaryNotReady);
        }
        self.summary = None;
        self.summary_request().ok_or(ReadingError::Empty)
    }

    /// Install the summary session, dropping any previous one
    pub fn attach_summary(&mut self, session: LiveSession) {
        self.summary = Some(session);
    }

    /// Request the closing summary
    ///
    /// # Errors
    ///
    /// Returns [`ReadingError::SummaryNotReady`] before the last card's
    /// interpretation has finished.
    pub async fn request_summary<B>(&mut self, backend: &B) -> Result<(), ReadingError>
    where
        B: InterpretationBackend + ?Sized,
    {
        let request = self.begin_summary()?;
        info!(cards = self.cards.len(), "Requesting final summary");
        let session = backend.open_session(&request).await;
        self.attach_summary(session);
        Ok(())
    }

    /// Interpretation of the current card, once revealed
    #[must_use]
    pub fn interpretation(&self) -> Option<&LiveSession> {
        self.interpretation.as_ref()
    }

    /// Mutable interpretation of the current card
    pub fn interpretation_mut(&mut self) -> Option<&mut LiveSession> {
        self.interpretation.as_mut()
    }

    /// The closing summary, once requested
    #[must_use]
    pub fn summary(&self) -> Option<&LiveSession> {
        self.summary.as_ref()
    }

    /// Mutable closing summary
    pub fn summary_mut(&mut self) -> Option<&mut LiveSession> {
        self.summary.as_mut()
    }

    /// Drain ready updates from both sessions; returns whether anything changed
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        if let Some(live) = self.interpretation.as_mut() {
            changed |= live.poll();
        }
        if let Some(live) = self.summary.as_mut() {
            changed |= live.poll();
        }
        changed
    }
}
