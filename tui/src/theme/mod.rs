//! Theme and Colors
//!
//! Night-sky palette for the reading table: deep indigo card backs, gold
//! accents for chosen cards and headings, and a gray ramp used to fade cards
//! as they move away from the center.

use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// Card Palette
// ============================================================================

/// Card face border
pub const CARD_BORDER: Color = Color::Rgb(200, 180, 255);

/// Card picked into the spread
pub const CARD_CHOSEN: Color = Color::Rgb(255, 215, 110);

/// Reversed card marker
pub const CARD_REVERSED: Color = Color::Rgb(255, 140, 140);

/// Card back fill
pub const CARD_BACK: Color = Color::Rgb(40, 30, 80);

// ============================================================================
// UI Colors
// ============================================================================

/// Headings and titles
pub const GOLD: Color = Color::Rgb(255, 215, 110);

/// Body text
pub const TEXT: Color = Color::Rgb(225, 220, 240);

/// System/dim text
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 120);

/// Error red
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);

/// Horizontal rule
pub const RULE: Color = Color::Rgb(120, 100, 170);

/// Darkest gray a fading card reaches
const FADE_FLOOR: f64 = 60.0;

/// Border color for a card at `opacity` (0.0 to 1.0)
///
/// Terminals have no alpha, so opacity is approximated by blending the base
/// color toward the background.
#[must_use]
pub fn faded(base: Color, opacity: f64) -> Color {
    let Color::Rgb(r, g, b) = base else {
        return base;
    };
    let t = opacity.clamp(0.0, 1.0);
    let mix = |c: u8| (FADE_FLOOR + (f64::from(c) - FADE_FLOOR) * t).round() as u8;
    Color::Rgb(mix(r), mix(g), mix(b))
}

/// Heading style
#[must_use]
pub fn heading() -> Style {
    Style::default().fg(GOLD).add_modifier(Modifier::BOLD)
}

/// Status bar style
#[must_use]
pub fn status() -> Style {
    Style::default().fg(DIM_GRAY)
}
