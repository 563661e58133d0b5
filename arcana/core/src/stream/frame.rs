//! Line framing for the `data: <json>\n` event protocol

use serde_json::Value;

/// Prefix every event line must carry
pub const DATA_PREFIX: &str = "data: ";

/// Reassembles complete lines from arbitrarily split byte chunks
///
/// Bytes are buffered undecoded until a newline arrives, so a multi-byte
/// character split across two chunks is decoded whole.
#[derive(Debug, Default)]
pub struct LineAssembler {
    buffer: Vec<u8>,
}

impl LineAssembler {
    /// Create an empty assembler
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chunk and return every line it completed (without terminators)
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(pos) = self.buffer[start..].iter().position(|&b| b == b'\n') {
            let end = start + pos;
            lines.push(decode(&self.buffer[start..end]));
            start = end + 1;
        }
        self.buffer.drain(..start);
        lines
    }

    /// Flush a trailing line that never got its newline
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let line = decode(&self.buffer);
        self.buffer.clear();
        Some(line)
    }

    /// Bytes waiting for a newline
    #[must_use]
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

fn decode(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

/// Fields of one event
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventPayload {
    /// Text to append
    pub content: Option<String>,
    /// End of a successful stream
    pub done: bool,
    /// Server-side warning, shown inline
    pub error: Option<String>,
}

/// Decode one line, or `None` if it is not a well-formed event
///
/// Lines without the `data: ` prefix and lines whose remainder is not a JSON
/// object are dropped. Empty `content` and `error` strings count as absent.
#[must_use]
pub fn decode_line(line: &str) -> Option<EventPayload> {
    let json = line.strip_prefix(DATA_PREFIX)?;
    let data: Value = serde_json::from_str(json).ok()?;
    if !data.is_object() {
        return None;
    }

    let content = data
        .get("content")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let done = data.get("done").and_then(Value::as_bool).unwrap_or(false);

    let error = match data.get("error") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    };

    Some(EventPayload {
        content,
        done,
        error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lines_split_across_chunks() {
        let mut lines = LineAssembler::new();
        assert!(lines.push(b"data: {\"con").is_empty());
        assert_eq!(lines.pending(), 11);

        let done = lines.push(b"tent\":\"A\"}\ndata: ");
        assert_eq!(done, vec![r#"data: {"content":"A"}"#.to_string()]);
        assert_eq!(lines.finish(), Some("data: ".to_string()));
        assert_eq!(lines.finish(), None);
    }

    #[test]
    fn test_multibyte_character_split() {
        let text = "data: {\"content\":\"운명\"}\n";
        let bytes = text.as_bytes();
        // Split inside the first Hangul syllable
        let cut = text.find('운').unwrap() + 1;

        let mut lines = LineAssembler::new();
        assert!(lines.push(&bytes[..cut]).is_empty());
        let out = lines.push(&bytes[cut..]);
        assert_eq!(out, vec![text.trim_end().to_string()]);
    }

    #[test]
    fn test_crlf_terminators() {
        let mut lines = LineAssembler::new();
        let out = lines.push(b"data: {}\r\n\r\n");
        assert_eq!(out, vec!["data: {}".to_string(), String::new()]);
    }

    #[test]
    fn test_decode_fields() {
        let payload = decode_line(r#"data: {"content":"hi","done":true,"error":"slow"}"#).unwrap();
        assert_eq!(
            payload,
            EventPayload {
                content: Some("hi".into()),
                done: true,
                error: Some("slow".into()),
            }
        );
    }

    #[test]
    fn test_decode_rejects_noise() {
        assert_eq!(decode_line(": keep-alive"), None);
        assert_eq!(decode_line("event: message"), None);
        assert_eq!(decode_line("data:{\"content\":\"x\"}"), None);
        assert_eq!(decode_line("data: {not json"), None);
        assert_eq!(decode_line("data: [1,2]"), None);
        assert_eq!(decode_line("data: {}"), Some(EventPayload::default()));
    }

    #[test]
    fn test_non_string_error_is_rendered() {
        let payload = decode_line(r#"data: {"error":{"code":503}}"#).unwrap();
        assert_eq!(payload.error.as_deref(), Some(r#"{"code":503}"#));
        assert_eq!(decode_line(r#"data: {"error":null}"#).unwrap().error, None);
    }
}
