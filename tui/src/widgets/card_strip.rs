//! CardStrip Widget
//!
//! Paints a carousel's projected slots as overlapping card boxes. Pixel
//! transforms from the core projector are mapped to terminal cells by fixed
//! cell dimensions, and cards are drawn back to front by z-index so the
//! centered card ends up on top.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, BorderType, Clear, Widget};
use unicode_width::UnicodeWidthStr;

use arcana_core::SlotTransform;

use crate::theme;

/// Horizontal pixels per terminal column
pub const CELL_WIDTH_PX: f64 = 6.0;

/// Vertical pixels per terminal row
pub const CELL_HEIGHT_PX: f64 = 12.0;

/// Full-size card width in columns
pub const CARD_WIDTH: u16 = 13;

/// Full-size card height in rows
pub const CARD_HEIGHT: u16 = 9;

/// Column of a pointer event in carousel pixels
#[must_use]
pub fn column_to_px(column: u16) -> f64 {
    f64::from(column) * CELL_WIDTH_PX
}

/// What to print on one card
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CardFace {
    /// Card name
    pub title: String,
    /// Second line (position or orientation)
    pub caption: Option<String>,
    /// Picked into the spread
    pub chosen: bool,
    /// Lies reversed
    pub reversed: bool,
    /// Face down
    pub hidden: bool,
}

/// A face placed by its slot transform
#[derive(Clone, Debug)]
pub struct PlacedCard {
    /// Projected transform
    pub transform: SlotTransform,
    /// What to draw
    pub face: CardFace,
}

/// Cell rectangle for a card with `transform`, clipped to `area`
#[must_use]
pub fn card_rect(area: Rect, transform: &SlotTransform) -> Option<Rect> {
    let width = (f64::from(CARD_WIDTH) * transform.scale).round().max(3.0);
    let height = (f64::from(CARD_HEIGHT) * transform.scale).round().max(3.0);

    let center_x = f64::from(area.x) + f64::from(area.width) / 2.0
        + transform.translate_x / CELL_WIDTH_PX;
    let top = f64::from(area.y) + transform.translate_y / CELL_HEIGHT_PX;

    let left = (center_x - width / 2.0).round();
    let right = left + width;
    let bottom = top.round() + height;

    let x0 = left.max(f64::from(area.left()));
    let x1 = right.min(f64::from(area.right()));
    let y0 = top.round().max(f64::from(area.top()));
    let y1 = bottom.min(f64::from(area.bottom()));
    if x1 - x0 < 1.0 || y1 - y0 < 1.0 {
        return None;
    }
    Some(Rect::new(x0 as u16, y0 as u16, (x1 - x0) as u16, (y1 - y0) as u16))
}

/// A row of cards painted from projected transforms
pub struct CardStrip {
    cards: Vec<PlacedCard>,
}

impl CardStrip {
    /// Strip over `cards`, painted back to front by z-index
    pub fn new(mut cards: Vec<PlacedCard>) -> Self {
        cards.sort_by_key(|c| c.transform.z_index);
        Self { cards }
    }
}

impl Widget for CardStrip {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for card in self.cards {
            let Some(rect) = card_rect(area, &card.transform) else {
                continue;
            };
            Clear.render(rect, buf);

            let face = &card.face;
            let base = if face.chosen {
                theme::CARD_CHOSEN
            } else {
                theme::CARD_BORDER
            };
            let color = theme::faded(base, card.transform.opacity);
            let mut block = Block::bordered()
                .border_type(if face.chosen {
                    BorderType::Double
                } else {
                    BorderType::Rounded
                })
                .border_style(Style::default().fg(color));
            if face.hidden {
                block = block.style(Style::default().bg(theme::CARD_BACK));
            }
            let inner = block.inner(rect);
            block.render(rect, buf);

            if face.hidden || inner.width == 0 || inner.height == 0 {
                continue;
            }

            let title_style = Style::default()
                .fg(theme::faded(theme::TEXT, card.transform.opacity))
                .add_modifier(Modifier::BOLD);
            let mut y = inner.y;
            for line in fit_words(&face.title, inner.width as usize) {
                if y >= inner.bottom() {
                    break;
                }
                buf.set_stringn(inner.x, y, &line, inner.width as usize, title_style);
                y += 1;
            }

            let caption = if face.reversed {
                Some(("reversed".to_string(), theme::CARD_REVERSED))
            } else {
                face.caption.clone().map(|c| (c, theme::DIM_GRAY))
            };
            if let Some((text, fg)) = caption {
                let last = inner.bottom().saturating_sub(1);
                if last >= y {
                    let style = Style::default().fg(theme::faded(fg, card.transform.opacity));
                    buf.set_stringn(inner.x, last, &text, inner.width as usize, style);
                }
            }
        }
    }
}

/// Greedy word wrap; words wider than `width` are cut
fn fit_words(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.width()
        } else {
            current.width() + 1 + word.width()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_centered_card_rect() {
        let area = Rect::new(0, 0, 81, 12);
        let rect = card_rect(area, &SlotTransform::at(0.0, 90.0)).unwrap();
        assert_eq!(rect.width, CARD_WIDTH);
        assert_eq!(rect.height, CARD_HEIGHT);
        // 40.5 - 6.5 = 34
        assert_eq!(rect.x, 34);
        assert_eq!(rect.y, 0);
    }

    #[test]
    fn test_neighbor_is_shifted_and_smaller() {
        let area = Rect::new(0, 0, 81, 12);
        let center = card_rect(area, &SlotTransform::at(0.0, 90.0)).unwrap();
        let right = card_rect(area, &SlotTransform::at(1.0, 90.0)).unwrap();
        assert!(right.x > center.x);
        assert!(right.width < center.width);
    }

    #[test]
    fn test_offscreen_card_skipped() {
        let area = Rect::new(0, 0, 40, 12);
        assert!(card_rect(area, &SlotTransform::at(20.0, 90.0)).is_none());
    }

    #[test]
    fn test_fit_words() {
        assert_eq!(
            fit_words("Queen of Pentacles", 9),
            vec!["Queen of", "Pentacles"]
        );
        assert_eq!(fit_words("The Fool", 20), vec!["The Fool"]);
    }

    #[test]
    fn test_render_draws_topmost_last() {
        let area = Rect::new(0, 0, 60, 12);
        let mut buf = Buffer::empty(area);
        let cards = vec![
            PlacedCard {
                transform: SlotTransform::at(0.0, 90.0),
                face: CardFace {
                    title: "Sun".into(),
                    ..CardFace::default()
                },
            },
            PlacedCard {
                transform: SlotTransform::at(0.5, 90.0),
                face: CardFace {
                    title: "Moon".into(),
                    ..CardFace::default()
                },
            },
        ];
        CardStrip::new(cards).render(area, &mut buf);

        let text: String = (0..area.width)
            .map(|x| buf[(x, 1)].symbol().to_string())
            .collect();
        assert!(text.contains("Sun"), "{text}");
    }
}
