//! Allow-list HTML sanitizer
//!
//! Rewrites a fragment so that only allow-listed tags and attributes survive.
//! Everything else is either dropped (unknown tags, unknown attributes) or
//! neutralized (a `<` or `>` that does not form an allowed tag is escaped).
//! Text content of dropped elements is kept as plain text.
//!
//! Surviving tags are also kept properly nested: closing an outer element
//! closes the inner ones still open, a closing tag with nothing to close is
//! dropped, and anything left open is closed at the end of the fragment.

use std::collections::HashSet;

/// Tags the renderer emits
const ALLOWED_TAGS: [&str; 5] = ["h2", "strong", "em", "hr", "br"];

/// Tags written without a closing tag
const VOID_TAGS: [&str; 2] = ["hr", "br"];

/// Attributes the renderer emits
const ALLOWED_ATTRIBUTES: [&str; 1] = ["class"];

/// Allow-list sanitizer for rendered interpretation text
#[derive(Clone, Debug)]
pub struct Sanitizer {
    allowed_tags: HashSet<&'static str>,
    allowed_attributes: HashSet<&'static str>,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self {
            allowed_tags: ALLOWED_TAGS.into_iter().collect(),
            allowed_attributes: ALLOWED_ATTRIBUTES.into_iter().collect(),
        }
    }
}

/// A tag recognized in the input
struct Tag<'a> {
    name: String,
    closing: bool,
    attributes: Vec<(String, Option<&'a str>)>,
    /// Byte length of the whole tag including `<` and `>`
    len: usize,
}

impl Sanitizer {
    /// Create a sanitizer with the default allow-lists
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a tag name is allowed (case-insensitive)
    #[must_use]
    pub fn allows_tag(&self, name: &str) -> bool {
        self.allowed_tags.contains(name.to_ascii_lowercase().as_str())
    }

    /// Whether an attribute name is allowed (case-insensitive)
    #[must_use]
    pub fn allows_attribute(&self, name: &str) -> bool {
        self.allowed_attributes
            .contains(name.to_ascii_lowercase().as_str())
    }

    /// Sanitize `html`
    #[must_use]
    pub fn sanitize(&self, html: &str) -> String {
        let mut out = String::with_capacity(html.len());
        let mut open: Vec<String> = Vec::new();
        let mut rest = html;

        while let Some(pos) = rest.find(['<', '>']) {
            out.push_str(&rest[..pos]);
            rest = &rest[pos..];

            if rest.starts_with('>') {
                out.push_str("&gt;");
                rest = &rest[1..];
                continue;
            }

            match parse_tag(rest) {
                Some(tag) => {
                    if self.allowed_tags.contains(tag.name.as_str()) {
                        self.write_tag(&tag, &mut open, &mut out);
                    }
                    rest = &rest[tag.len..];
                }
                None => {
                    out.push_str("&lt;");
                    rest = &rest[1..];
                }
            }
        }

        out.push_str(rest);
        while let Some(name) = open.pop() {
            push_closing(&name, &mut out);
        }
        out
    }

    fn write_tag(&self, tag: &Tag<'_>, open: &mut Vec<String>, out: &mut String) {
        let is_void = VOID_TAGS.contains(&tag.name.as_str());
        if tag.closing {
            if is_void {
                return;
            }
            // Unmatched closing tags are dropped
            if let Some(depth) = open.iter().rposition(|name| *name == tag.name) {
                for name in open.drain(depth..).rev() {
                    push_closing(&name, out);
                }
            }
            return;
        }
        if !is_void {
            open.push(tag.name.clone());
        }

        out.push('<');
        out.push_str(&tag.name);
        for (name, value) in &tag.attributes {
            if !self.allowed_attributes.contains(name.as_str()) {
                continue;
            }
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_attribute(value.unwrap_or("")));
            out.push('"');
        }
        out.push_str(if is_void { " />" } else { ">" });
    }
}

fn push_closing(name: &str, out: &mut String) {
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

/// Sanitize with the default allow-lists
#[must_use]
pub fn sanitize(html: &str) -> String {
    Sanitizer::default().sanitize(html)
}

/// Parse a tag at the start of `input` (which begins with `<`)
///
/// Returns `None` when the `<` does not open a well-formed tag, in which case
/// it is treated as text.
fn parse_tag(input: &str) -> Option<Tag<'_>> {
    let bytes = input.as_bytes();
    let mut i = 1;

    let closing = bytes.get(i) == Some(&b'/');
    if closing {
        i += 1;
    }

    let name_start = i;
    while i < bytes.len() && bytes[i].is_ascii_alphanumeric() {
        i += 1;
    }
    if i == name_start || !bytes[name_start].is_ascii_alphabetic() {
        return None;
    }
    let name = input[name_start..i].to_ascii_lowercase();

    let mut attributes = Vec::new();
    loop {
        while i < bytes.len() && (bytes[i].is_ascii_whitespace() || bytes[i] == b'/') {
            i += 1;
        }
        match bytes.get(i) {
            None => return None,
            Some(b'>') => {
                return Some(Tag {
                    name,
                    closing,
                    attributes,
                    len: i + 1,
                });
            }
            Some(_) => {}
        }

        let attr_start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && !matches!(bytes[i], b'=' | b'>' | b'/')
        {
            i += 1;
        }
        if i == attr_start {
            // A stray '=' with no name
            i += 1;
            continue;
        }
        let attr_name = input[attr_start..i].to_ascii_lowercase();

        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if bytes.get(i) != Some(&b'=') {
            attributes.push((attr_name, None));
            continue;
        }
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }

        let value = match bytes.get(i) {
            None => return None,
            Some(&quote @ (b'"' | b'\'')) => {
                let value_start = i + 1;
                let value_len = bytes[value_start..].iter().position(|&b| b == quote)?;
                i = value_start + value_len + 1;
                &input[value_start..value_start + value_len]
            }
            Some(_) => {
                let value_start = i;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                    i += 1;
                }
                &input[value_start..i]
            }
        };
        attributes.push((attr_name, Some(value)));
    }
}

fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
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
