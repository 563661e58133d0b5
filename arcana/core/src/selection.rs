//! Card Selection
//!
//! The ordered pick list shared by the selection screen and the reading. Order
//! of insertion is the spread position; picking a card that is already in
//! the list takes it back out.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::deck::{Card, CardId, Orientation};

/// Cards in a complete spread
pub const MAX_SELECTION: usize = 10;

/// The ten positions of the Celtic cross spread, in pick order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpreadPosition {
    /// The querent's present situation
    Present,
    /// What blocks the present situation
    Challenge,
    /// The unconscious root of the matter
    Subconscious,
    /// The recent past
    Past,
    /// Influences that may develop
    Potential,
    /// The near future
    NearFuture,
    /// How the querent sees themself
    SelfImage,
    /// Surroundings and other people
    Environment,
    /// Hopes and fears
    HopesAndFears,
    /// Final outcome
    Outcome,
}

impl SpreadPosition {
    /// All positions in order
    pub const ALL: [SpreadPosition; MAX_SELECTION] = [
        SpreadPosition::Present,
        SpreadPosition::Challenge,
        SpreadPosition::Subconscious,
        SpreadPosition::Past,
        SpreadPosition::Potential,
        SpreadPosition::NearFuture,
        SpreadPosition::SelfImage,
        SpreadPosition::Environment,
        SpreadPosition::HopesAndFears,
        SpreadPosition::Outcome,
    ];

    /// Position for a zero-based pick index
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Zero-based pick index
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// One-based position number
    #[must_use]
    pub fn number(self) -> usize {
        self.index() + 1
    }

    /// Short title
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::Challenge => "Challenge",
            Self::Subconscious => "Subconscious",
            Self::Past => "Past",
            Self::Potential => "Potential",
            Self::NearFuture => "Near Future",
            Self::SelfImage => "Self",
            Self::Environment => "Environment",
            Self::HopesAndFears => "Hopes and Fears",
            Self::Outcome => "Outcome",
        }
    }
}

/// Why a toggle was refused
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SelectionError {
    /// The spread is already complete
    #[error("selection already holds {max} cards")]
    Full {
        /// The selection limit
        max: usize,
    },
    /// The carousel is still moving
    #[error("carousel is still settling")]
    Busy,
    /// Nothing is mounted at the current index
    #[error("no card at index {0}")]
    NoCard(usize),
}

/// Result of a successful toggle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Toggle {
    /// The card was appended
    Added {
        /// Position it now fills
        position: SpreadPosition,
        /// Orientation drawn for it
        orientation: Orientation,
    },
    /// The card was taken out
    Removed {
        /// Position it used to fill
        position: SpreadPosition,
    },
}

/// A card with the orientation drawn when it was picked
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedCard {
    /// The card
    pub card: Card,
    /// Fixed at selection time
    pub orientation: Orientation,
}

impl SelectedCard {
    /// Whether the card lies reversed
    #[must_use]
    pub fn is_reversed(&self) -> bool {
        self.orientation.is_reversed()
    }
}

/// Ordered list of picked cards, at most [`MAX_SELECTION`] long
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    cards: Vec<SelectedCard>,
}

impl Selection {
    /// Create an empty selection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `card` (drawing its orientation) or remove it if already picked
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::Full`] when adding to a complete spread; the
    /// selection is left unchanged.
    pub fn toggle<R: Rng + ?Sized>(
        &mut self,
        card: &Card,
        rng: &mut R,
    ) -> Result<Toggle, SelectionError> {
        if let Some(removed) = self.remove(card.id) {
            return Ok(removed);
        }
        if self.is_complete() {
            return Err(SelectionError::Full { max: MAX_SELECTION });
        }
        self.push(card, Orientation::draw(rng))
    }

    /// Add `card` with a known orientation or remove it if already picked
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::Full`] when adding to a complete spread.
    pub fn toggle_with(
        &mut self,
        card: &Card,
        orientation: Orientation,
    ) -> Result<Toggle, SelectionError> {
        if let Some(removed) = self.remove(card.id) {
            return Ok(removed);
        }
        self.push(card, orientation)
    }

    fn push(&mut self, card: &Card, orientation: Orientation) -> Result<Toggle, SelectionError> {
        let position = SpreadPosition::from_index(self.cards.len())
            .ok_or(SelectionError::Full { max: MAX_SELECTION })?;
        self.cards.push(SelectedCard {
            card: card.clone(),
            orientation,
        });
        Ok(Toggle::Added {
            position,
            orientation,
        })
    }

    fn remove(&mut self, id: CardId) -> Option<Toggle> {
        let index = self.cards.iter().position(|c| c.card.id == id)?;
        self.cards.remove(index);
        SpreadPosition::from_index(index).map(|position| Toggle::Removed { position })
    }

    /// Spread position a card occupies
    #[must_use]
    pub fn position_of(&self, id: CardId) -> Option<SpreadPosition> {
        self.cards
            .iter()
            .position(|c| c.card.id == id)
            .and_then(SpreadPosition::from_index)
    }

    /// Whether a card is picked
    #[must_use]
    pub fn contains(&self, id: CardId) -> bool {
        self.cards.iter().any(|c| c.card.id == id)
    }

    /// Position the next pick will fill, if any
    #[must_use]
    pub fn next_position(&self) -> Option<SpreadPosition> {
        SpreadPosition::from_index(self.cards.len())
    }

    /// Number of picked cards
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether nothing is picked
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Whether all positions are filled
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.cards.len() >= MAX_SELECTION
    }

    /// Picks still needed
    #[must_use]
    pub fn remaining(&self) -> usize {
        MAX_SELECTION.saturating_sub(self.cards.len())
    }

    /// Picked card at a spread index
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&SelectedCard> {
        self.cards.get(index)
    }

    /// Picked cards in spread order
    #[must_use]
    pub fn as_slice(&self) -> &[SelectedCard] {
        &self.cards
    }

    /// Iterate picked cards in spread order
    pub fn iter(&self) -> impl Iterator<Item = &SelectedCard> {
        self.cards.iter()
    }

    /// Drop every pick
    pub fn clear(&mut self) {
        self.cards.clear();
    }
}
