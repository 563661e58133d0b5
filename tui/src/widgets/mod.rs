//! Widgets for the reading table

pub mod card_strip;
pub mod text_block;

pub use card_strip::{CardFace, CardStrip, PlacedCard};
pub use text_block::{TextBlock, TextBlockState};
