//! TextBlock Widget
//!
//! A borderless, scrollable region showing an interpretation. Input is the
//! sanitized HTML produced by the core renderer, which only ever contains
//! `h2`, `strong`, `em`, `hr` and `br`, so a tiny tag walker is enough to turn
//! it back into styled terminal lines.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::StatefulWidget;
use unicode_width::UnicodeWidthStr;

use crate::theme;

/// State for a scrollable text block
#[derive(Default)]
pub struct TextBlockState {
    /// Scroll offset (lines from top)
    pub scroll_offset: usize,
    /// Total content lines
    pub total_lines: usize,
    /// Keep the newest text in view while it streams in
    pub follow: bool,
}

impl TextBlockState {
    /// Scroll by delta (positive = down)
    pub fn scroll(&mut self, delta: i32) {
        let new_offset = self.scroll_offset as i64 + i64::from(delta);
        self.scroll_offset = new_offset.max(0) as usize;
        self.follow = false;
    }

    /// Scroll to top and stop following
    pub fn reset(&mut self) {
        self.scroll_offset = 0;
        self.follow = false;
    }

    /// Scroll to bottom and keep following new text
    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = self.total_lines.saturating_sub(1);
        self.follow = true;
    }
}

/// Styled run of text before wrapping
type Run = (String, Style);

/// Logical lines of styled runs parsed from renderer HTML
#[must_use]
pub fn html_lines(html: &str) -> Vec<Vec<Run>> {
    let mut lines: Vec<Vec<Run>> = vec![Vec::new()];
    let mut bold = false;
    let mut italic = false;
    let mut heading = false;
    let mut rest = html;

    let style_for = |bold: bool, italic: bool, heading: bool| {
        let mut style = if heading {
            theme::heading()
        } else {
            Style::default().fg(theme::TEXT)
        };
        if bold {
            style = style.add_modifier(Modifier::BOLD);
        }
        if italic {
            style = style.add_modifier(Modifier::ITALIC);
        }
        style
    };

    while !rest.is_empty() {
        let Some(start) = rest.find('<') else {
            push_text(&mut lines, rest, style_for(bold, italic, heading));
            break;
        };
        if start > 0 {
            push_text(&mut lines, &rest[..start], style_for(bold, italic, heading));
        }
        let Some(len) = rest[start..].find('>') else {
            push_text(&mut lines, &rest[start..], style_for(bold, italic, heading));
            break;
        };
        let tag = &rest[start + 1..start + len];
        rest = &rest[start + len + 1..];

        let closing = tag.starts_with('/');
        let name = tag
            .trim_start_matches('/')
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or("");
        match (name, closing) {
            ("strong", _) => bold = !closing,
            ("em", _) => italic = !closing,
            ("h2", false) => {
                if lines.last().is_some_and(|l| !l.is_empty()) {
                    lines.push(Vec::new());
                }
                heading = true;
            }
            ("h2", true) => {
                heading = false;
                lines.push(Vec::new());
            }
            ("br", _) => lines.push(Vec::new()),
            ("hr", _) => {
                if lines.last().is_some_and(|l| !l.is_empty()) {
                    lines.push(Vec::new());
                }
                if let Some(line) = lines.last_mut() {
                    line.push(("─".repeat(3), Style::default().fg(theme::RULE)));
                }
                lines.push(Vec::new());
            }
            _ => {}
        }
    }

    if lines.len() > 1 && lines.last().is_some_and(Vec::is_empty) {
        lines.pop();
    }
    lines
}

fn push_text(lines: &mut [Vec<Run>], text: &str, style: Style) {
    let decoded = decode_entities(text);
    if let Some(line) = lines.last_mut() {
        if !decoded.is_empty() {
            line.push((decoded, style));
        }
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Greedy word wrap of styled runs into lines at most `width` cells wide
///
/// Rule lines stretch to the full width.
#[must_use]
pub fn wrap_runs(runs: &[Run], width: usize) -> Vec<Line<'static>> {
    if width == 0 {
        return Vec::new();
    }
    if let [(text, style)] = runs {
        if text.chars().all(|c| c == '─') && !text.is_empty() {
            return vec![Line::from(Span::styled("─".repeat(width), *style))];
        }
    }

    let mut out = Vec::new();
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut used = 0;

    for (text, style) in runs {
        for piece in text.split_inclusive(' ') {
            let piece_width = piece.trim_end().width();
            if used > 0 && used + piece_width > width {
                out.push(Line::from(std::mem::take(&mut spans)));
                used = 0;
            }
            let piece = if used == 0 { piece.trim_start() } else { piece };
            if piece.is_empty() {
                continue;
            }
            used += piece.width();
            spans.push(Span::styled(piece.to_string(), *style));
        }
    }
    out.push(Line::from(spans));
    out
}

/// A borderless, scrollable text block
pub struct TextBlock<'a> {
    html: &'a str,
    placeholder: Option<&'a str>,
}

impl<'a> TextBlock<'a> {
    pub fn new(html: &'a str) -> Self {
        Self {
            html,
            placeholder: None,
        }
    }

    /// Dim text shown while there is nothing to display
    pub fn placeholder(mut self, text: &'a str) -> Self {
        self.placeholder = Some(text);
        self
    }
}

impl StatefulWidget for TextBlock<'_> {
    type State = TextBlockState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        if self.html.is_empty() {
            state.total_lines = 0;
            if let Some(text) = self.placeholder {
                buf.set_stringn(area.x, area.y, text, area.width as usize, theme::status());
            }
            return;
        }

        let wrapped: Vec<Line<'static>> = html_lines(self.html)
            .iter()
            .flat_map(|runs| wrap_runs(runs, area.width as usize))
            .collect();
        state.total_lines = wrapped.len();

        // Clamp scroll
        let max_scroll = state.total_lines.saturating_sub(area.height as usize);
        if state.follow {
            state.scroll_offset = max_scroll;
        }
        state.scroll_offset = state.scroll_offset.min(max_scroll);

        for (i, line) in wrapped
            .iter()
            .skip(state.scroll_offset)
            .take(area.height as usize)
            .enumerate()
        {
            let y = area.y + i as u16;
            buf.set_line(area.x, y, line, area.width);
        }
    }
}
