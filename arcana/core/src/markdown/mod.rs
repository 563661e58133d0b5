//! Incremental Markdown Rendering
//!
//! Interpretations arrive as a growing buffer of a small markdown subset:
//!
//! | Source          | Output                            |
//! |-----------------|-----------------------------------|
//! | `## heading`    | `<h2 class="md-h2">heading</h2>`  |
//! | `**bold**`      | `<strong>bold</strong>`           |
//! | `*italic*`      | `<em>italic</em>`                 |
//! | `---`           | `<hr class="md-hr" />`            |
//! | newline         | `<br />`                          |
//!
//! Headings and rules are recognized on their own line and swallow the line
//! break that ends them. Emphasis markers pair up non-greedily within a line;
//! an unpaired marker stays literal. All HTML in the source is escaped before
//! substitution, and every rendered fragment then goes through the
//! allow-list [`Sanitizer`].
//!
//! [`IncrementalMarkdownRenderer`] caches the HTML of complete lines, so each
//! new chunk only costs the lines it touches.

mod sanitize;

pub use sanitize::{sanitize, Sanitizer};

/// Render a whole buffer at once
#[must_use]
pub fn render(text: &str) -> String {
    let sanitizer = Sanitizer::default();
    let mut out = String::new();
    for line in text.split_inclusive('\n') {
        out.push_str(&sanitizer.sanitize(&render_line(line)));
    }
    out
}

/// Renderer that re-renders only the unfinished tail of a growing buffer
#[derive(Debug, Default)]
pub struct IncrementalMarkdownRenderer {
    sanitizer: Sanitizer,
    /// Source bytes already rendered into `committed`; always ends on a newline
    committed_len: usize,
    committed: String,
    output: String,
}

impl IncrementalMarkdownRenderer {
    /// Create an empty renderer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Render `text`, which should extend the text from the previous call
    ///
    /// Input that does not extend the previous text (shorter, or no longer
    /// ending its committed part with a newline) restarts rendering from
    /// scratch.
    pub fn render(&mut self, text: &str) -> &str {
        if !self.extends_committed(text) {
            self.reset();
        }

        let pending = &text[self.committed_len..];
        let complete = pending.rfind('\n').map_or(0, |pos| pos + 1);
        for line in pending[..complete].split_inclusive('\n') {
            self.committed
                .push_str(&self.sanitizer.sanitize(&render_line(line)));
        }
        self.committed_len += complete;

        self.output.clear();
        self.output.push_str(&self.committed);
        let tail = &text[self.committed_len..];
        if !tail.is_empty() {
            self.output
                .push_str(&self.sanitizer.sanitize(&render_line(tail)));
        }
        &self.output
    }

    /// Last rendered output
    #[must_use]
    pub fn html(&self) -> &str {
        &self.output
    }

    /// Forget all cached output
    pub fn reset(&mut self) {
        self.committed_len = 0;
        self.committed.clear();
        self.output.clear();
    }

    fn extends_committed(&self, text: &str) -> bool {
        self.committed_len == 0
            || (text.len() >= self.committed_len
                && text.as_bytes()[self.committed_len - 1] == b'\n')
    }
}

/// Render one source line, with or without its trailing newline
fn render_line(line: &str) -> String {
    let (body, newline) = match line.strip_suffix('\n') {
        Some(body) => (body, true),
        None => (line, false),
    };
    let body = body.strip_suffix('\r').unwrap_or(body);
    let escaped = escape_html(body);

    if let Some(heading) = escaped.strip_prefix("## ") {
        return format!("<h2 class=\"md-h2\">{}</h2>", render_inline(heading));
    }
    if escaped.trim() == "---" {
        return "<hr class=\"md-hr\" />".to_string();
    }

    let mut out = render_inline(&escaped);
    if newline {
        out.push_str("<br />");
    }
    out
}

fn render_inline(text: &str) -> String {
    let bold = wrap_pairs(text, "**", "strong");
    wrap_pairs(&bold, "*", "em")
}

/// Replace non-overlapping `marker ... marker` pairs, leftmost first
fn wrap_pairs(text: &str, marker: &str, tag: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find(marker) {
        let inner_start = open + marker.len();
        let Some(close) = rest[inner_start..].find(marker) else {
            break;
        };
        out.push_str(&rest[..open]);
        out.push('<');
        out.push_str(tag);
        out.push('>');
        out.push_str(&rest[inner_start..inner_start + close]);
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
        rest = &rest[inner_start + close + marker.len()..];
    }

    out.push_str(rest);
    out
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
