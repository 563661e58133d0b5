//! Cards and Decks
//!
//! The card catalog itself comes from the reading server (`GET /api/cards`);
//! [`Deck::standard`] is the offline fallback with the usual 78-card layout.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Card identifier, unique within a deck
pub type CardId = u32;

/// Number of cards in the full catalog
pub const FULL_DECK_SIZE: usize = 78;

/// Major arcana names, ids 0-21
const MAJOR_ARCANA: [&str; 22] = [
    "The Fool",
    "The Magician",
    "The High Priestess",
    "The Empress",
    "The Emperor",
    "The Hierophant",
    "The Lovers",
    "The Chariot",
    "Strength",
    "The Hermit",
    "Wheel of Fortune",
    "Justice",
    "The Hanged Man",
    "Death",
    "Temperance",
    "The Devil",
    "The Tower",
    "The Star",
    "The Moon",
    "The Sun",
    "Judgement",
    "The World",
];

/// Minor arcana ranks, in catalog order within each suit
const RANKS: [&str; 14] = [
    "Ace", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Page",
    "Knight", "Queen", "King",
];

/// Errors building a deck
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeckError {
    /// Two cards share an id
    #[error("duplicate card id {0} in deck")]
    DuplicateId(CardId),
}

/// Minor arcana suit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    /// Wands
    Wands,
    /// Cups
    Cups,
    /// Swords
    Swords,
    /// Pentacles
    Pentacles,
}

impl Suit {
    /// All suits in catalog order
    pub const ALL: [Suit; 4] = [Suit::Wands, Suit::Cups, Suit::Swords, Suit::Pentacles];

    /// Parse a suit name, ignoring case
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "wands" => Some(Self::Wands),
            "cups" => Some(Self::Cups),
            "swords" => Some(Self::Swords),
            "pentacles" => Some(Self::Pentacles),
            _ => None,
        }
    }

    /// Display name
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Wands => "Wands",
            Self::Cups => "Cups",
            Self::Swords => "Swords",
            Self::Pentacles => "Pentacles",
        }
    }
}

/// Unknown suit labels in server catalogs are treated as "no suit"
fn lenient_suit<'de, D>(deserializer: D) -> Result<Option<Suit>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Suit::parse))
}

/// A card in the catalog
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Unique id
    pub id: CardId,
    /// Display name
    pub name: String,
    /// Suit (minor arcana only)
    #[serde(
        default,
        deserialize_with = "lenient_suit",
        skip_serializing_if = "Option::is_none"
    )]
    pub suit: Option<Suit>,
    /// Image reference
    #[serde(default)]
    pub image: String,
}

impl Card {
    /// Create a card without a suit
    pub fn new(id: CardId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            suit: None,
            image: String::new(),
        }
    }

    /// Set the suit
    #[must_use]
    pub fn with_suit(mut self, suit: Suit) -> Self {
        self.suit = Some(suit);
        self
    }

    /// Set the image reference
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }
}

/// Which way up a drawn card lies
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Upright
    #[default]
    Upright,
    /// Reversed
    Reversed,
}

impl Orientation {
    /// One fair coin flip
    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            Self::Reversed
        } else {
            Self::Upright
        }
    }

    /// Whether the card is reversed
    #[must_use]
    pub fn is_reversed(self) -> bool {
        matches!(self, Self::Reversed)
    }
}

/// An ordered set of cards with unique ids
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Build a deck, rejecting duplicate ids
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::DuplicateId`] for the first repeated id.
    pub fn new(cards: Vec<Card>) -> Result<Self, DeckError> {
        let mut seen = HashSet::with_capacity(cards.len());
        for card in &cards {
            if !seen.insert(card.id) {
                return Err(DeckError::DuplicateId(card.id));
            }
        }
        Ok(Self { cards })
    }

    /// The built-in 78-card catalog
    #[must_use]
    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(FULL_DECK_SIZE);

        for (id, name) in MAJOR_ARCANA.iter().enumerate() {
            cards.push(
                Card::new(id as CardId, *name).with_image(format!("/cards/major/{id:02}.jpg")),
            );
        }

        for suit in Suit::ALL {
            for (rank_idx, rank) in RANKS.iter().enumerate() {
                let id = cards.len() as CardId;
                cards.push(
                    Card::new(id, format!("{rank} of {}", suit.name()))
                        .with_suit(suit)
                        .with_image(format!(
                            "/cards/{}/{:02}.jpg",
                            suit.name().to_ascii_lowercase(),
                            rank_idx + 1
                        )),
                );
            }
        }

        Self { cards }
    }

    /// A shuffled copy, as presented on one visit to the selection screen
    #[must_use]
    pub fn shuffled<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let mut cards = self.cards.clone();
        cards.shuffle(rng);
        Self { cards }
    }

    /// Number of cards
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether the deck is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Card at a position
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    /// Card with a given id
    #[must_use]
    pub fn find(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    /// Cards in order
    #[must_use]
    pub fn as_slice(&self) -> &[Card] {
        &self.cards
    }

    /// Iterate cards in order
    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }
}
