//! Request payloads for the reading server

use serde::{Deserialize, Serialize};

use crate::deck::{Card, CardId};
use crate::selection::{SelectedCard, MAX_SELECTION};

/// `cardIndex` that asks for the closing summary of the whole spread
///
/// The summary shares the single-card endpoint; this out-of-range index is
/// how the server tells the two apart.
pub const SUMMARY_CARD_INDEX: usize = MAX_SELECTION;

/// A card as the server identifies it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRef {
    /// Card id
    pub id: CardId,
    /// Whether the card lies reversed
    pub is_reversed: bool,
}

impl From<&SelectedCard> for CardRef {
    fn from(selected: &SelectedCard) -> Self {
        Self {
            id: selected.card.id,
            is_reversed: selected.is_reversed(),
        }
    }
}

/// Reading topic picked before the spread
///
/// Every field is optional; an absent category goes over the wire as `{}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Stable identifier (`love`, `job`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Emoji or icon name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// One-line description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Category {
    fn preset(id: &str, name: &str, icon: &str, description: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            name: Some(name.to_string()),
            icon: Some(icon.to_string()),
            description: Some(description.to_string()),
        }
    }

    /// The built-in reading topics
    #[must_use]
    pub fn presets() -> Vec<Self> {
        vec![
            Self::preset("love", "Love", "♥️", "Romance and relationships"),
            Self::preset("job", "Career", "💼", "Jobs and career paths"),
            Self::preset("business", "Business", "🏢", "Ventures and investments"),
            Self::preset("money", "Money", "💰", "Wealth and finances"),
            Self::preset("study", "Study", "📖", "Learning and exams"),
        ]
    }

    /// Look up a preset by id
    #[must_use]
    pub fn by_id(id: &str) -> Option<Self> {
        Self::presets()
            .into_iter()
            .find(|c| c.id.as_deref() == Some(id))
    }
}

/// Body of `POST /api/interpret-card`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterpretationRequest {
    /// The card being interpreted (the first card for a summary)
    pub card: CardRef,
    /// Spread position, or [`SUMMARY_CARD_INDEX`]
    pub card_index: usize,
    /// Reading topic
    #[serde(default)]
    pub category: Category,
    /// Free-text situation from the querent
    #[serde(default)]
    pub situation: String,
    /// The whole spread in order
    pub all_cards: Vec<CardRef>,
}

impl InterpretationRequest {
    /// Request the interpretation of the card at `index`
    ///
    /// Returns `None` if `index` is outside the spread.
    #[must_use]
    pub fn for_card(
        cards: &[SelectedCard],
        index: usize,
        category: Option<&Category>,
        situation: &str,
    ) -> Option<Self> {
        let card = cards.get(index)?;
        Some(Self {
            card: card.into(),
            card_index: index,
            category: category.cloned().unwrap_or_default(),
            situation: situation.to_string(),
            all_cards: cards.iter().map(CardRef::from).collect(),
        })
    }

    /// Request the closing summary of the spread
    ///
    /// Returns `None` for an empty spread.
    #[must_use]
    pub fn final_summary(
        cards: &[SelectedCard],
        category: Option<&Category>,
        situation: &str,
    ) -> Option<Self> {
        let mut request = Self::for_card(cards, 0, category, situation)?;
        request.card_index = SUMMARY_CARD_INDEX;
        Some(request)
    }

    /// Whether this asks for the spread summary
    #[must_use]
    pub fn is_summary(&self) -> bool {
        self.card_index == SUMMARY_CARD_INDEX
    }
}

/// Body of `GET /api/cards`
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CatalogResponse {
    /// Whether the server could produce the catalog
    #[serde(default)]
    pub success: bool,
    /// The catalog
    #[serde(default)]
    pub cards: Vec<Card>,
}
