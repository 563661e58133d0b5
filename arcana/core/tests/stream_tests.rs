//! Stream protocol integration tests
//!
//! Exercises the path from raw network chunks to rendered HTML:
//! - Chunk-boundary invariance of the consumer
//! - Mid-line splits across chunks
//! - Transport failures becoming inline text
//! - Adversarial markdown through the sanitizer

use std::convert::Infallible;

use pretty_assertions::assert_eq;

use arcana_core::markdown::{render, IncrementalMarkdownRenderer};
use arcana_core::stream::{
    LiveSession, StreamConsumer, StreamHandle, StreamSession, StreamState, StreamUpdate,
};

// =============================================================================
// Helpers
// =============================================================================

const BODY: &str = "data: {\"content\":\"## The Star\\n\"}\n\
                    : keep-alive comment\n\
                    data: {\"content\":\"**Hope** returns, \"}\n\
                    data: not json at all\n\
                    data: {\"error\":\"model warming up\"}\n\
                    data: {\"content\":\"*quietly*. 별빛 ✨\"}\n\
                    data: {\"done\":true}\n\
                    data: {\"content\":\"after done\"}\n";

fn session_from_chunks(chunks: &[&[u8]]) -> StreamSession {
    let mut consumer = StreamConsumer::new();
    let mut session = StreamSession::new();
    for chunk in chunks {
        for update in consumer.feed(chunk) {
            session.apply(update);
        }
    }
    for update in consumer.end_of_stream() {
        session.apply(update);
    }
    session
}

fn chunked_body(chunks: Vec<Vec<u8>>) -> impl futures::Stream<Item = Result<Vec<u8>, Infallible>> {
    futures::stream::iter(chunks.into_iter().map(Ok))
}

// =============================================================================
// Chunk Boundaries
// =============================================================================

#[test]
fn test_single_chunk_reference() {
    let session = session_from_chunks(&[BODY.as_bytes()]);
    assert_eq!(
        session.text(),
        "## The Star\n**Hope** returns, \n\n⚠️ Error: model warming up*quietly*. 별빛 ✨"
    );
    assert_eq!(session.state(), StreamState::Done);
}

#[test]
fn test_every_two_way_split_matches_reference() {
    let bytes = BODY.as_bytes();
    let reference = session_from_chunks(&[bytes]);

    for cut in 0..=bytes.len() {
        let session = session_from_chunks(&[&bytes[..cut], &bytes[cut..]]);
        assert_eq!(session, reference, "split at byte {cut}");
    }
}

#[test]
fn test_byte_at_a_time_matches_reference() {
    let bytes = BODY.as_bytes();
    let reference = session_from_chunks(&[bytes]);

    let singles: Vec<&[u8]> = bytes.chunks(1).collect();
    assert_eq!(session_from_chunks(&singles), reference);

    for size in [2, 3, 7, 13, 64] {
        let chunks: Vec<&[u8]> = bytes.chunks(size).collect();
        assert_eq!(session_from_chunks(&chunks), reference, "chunk size {size}");
    }
}

#[test]
fn test_two_contents_split_mid_line_then_done() {
    let first = b"data: {\"content\":\"A\"}\ndata: {\"cont".as_slice();
    let second = b"ent\":\"B\"}\ndata: {\"done\":true}\n".as_slice();

    let session = session_from_chunks(&[first, second]);
    assert_eq!(session.text(), "AB");
    assert!(session.is_done());
}

// =============================================================================
// Live Sessions
// =============================================================================

#[tokio::test]
async fn test_live_session_over_spawned_stream() {
    let chunks: Vec<Vec<u8>> = BODY.as_bytes().chunks(5).map(<[u8]>::to_vec).collect();
    let mut live = LiveSession::new(StreamHandle::spawn(chunked_body(chunks)));

    let mut updates = Vec::new();
    while let Some(update) = live.next().await {
        updates.push(update);
    }

    assert_eq!(updates.last(), Some(&StreamUpdate::Done));
    assert!(updates.contains(&StreamUpdate::Warning("model warming up".into())));
    assert!(live.session().is_done());

    let html = live.html().to_string();
    assert!(html.starts_with("<h2 class=\"md-h2\">The Star</h2><strong>Hope</strong>"));
    assert!(html.contains("<em>quietly</em>"));
    assert!(!html.contains("after done"));
}

#[tokio::test]
async fn test_transport_error_is_inline_and_final() {
    let body = futures::stream::iter(vec![
        Ok(b"data: {\"content\":\"The Moon \"}\n".to_vec()),
        Err("connection reset by peer"),
    ]);
    let mut live = LiveSession::new(StreamHandle::spawn(body));
    let session = live.finish().await;

    assert_eq!(session.state(), StreamState::Failed);
    assert_eq!(
        session.text(),
        "The Moon \n\n⚠️ Could not reach the reading server: connection reset by peer"
    );
}

#[tokio::test]
async fn test_stream_without_done_still_completes() {
    let body = chunked_body(vec![b"data: {\"content\":\"cut short\"}".to_vec()]);
    let mut live = LiveSession::new(StreamHandle::spawn(body));
    let session = live.finish().await;

    assert!(session.is_done());
    assert_eq!(session.text(), "cut short");
}

// =============================================================================
// Adversarial Markdown
// =============================================================================

const ALLOWED_TAGS: [&str; 5] = ["h2", "strong", "em", "hr", "br"];

/// Every tag in `html` must be allow-listed and carry at most a class
fn assert_only_allowed_markup(html: &str) {
    let mut rest = html;
    while let Some(start) = rest.find('<') {
        let end = rest[start..]
            .find('>')
            .map(|e| start + e)
            .unwrap_or_else(|| panic!("unterminated tag in {html:?}"));
        let tag = &rest[start + 1..end];
        let name: String = tag
            .trim_start_matches('/')
            .chars()
            .take_while(char::is_ascii_alphanumeric)
            .collect();
        assert!(ALLOWED_TAGS.contains(&name.as_str()), "tag {tag:?} in {html:?}");

        let attrs = tag.trim_start_matches('/')[name.len()..].trim().trim_end_matches('/');
        if !attrs.trim().is_empty() {
            assert!(attrs.trim().starts_with("class=\""), "attrs {attrs:?} in {html:?}");
            assert_eq!(attrs.matches('=').count(), 1, "attrs {attrs:?} in {html:?}");
        }
        rest = &rest[end + 1..];
    }
}

#[test]
fn test_adversarial_inputs_yield_only_allowed_markup() {
    let inputs = [
        "<script>alert(1)</script>",
        "<img src=x onerror=alert(1)>",
        "## <a href=\"javascript:alert(1)\">click</a>",
        "**<b onmouseover=x>bold</b>**",
        "*<iframe src=//evil>*",
        "<h2 class=\"x\" onclick=\"y\">fake</h2>",
        "<<script>script>alert(1)<</script>/script>",
        "\"><svg/onload=alert(1)>",
        "---<style>body{}</style>---",
        "<br onload=1>\n<hr style=x>",
        "<!--<script>-->",
        "## **<em onclick=1>x</em>**\n---\n*<strong>y</strong>*",
    ];

    for input in inputs {
        let html = render(input);
        assert_only_allowed_markup(&html);
        assert!(!html.to_lowercase().contains("<script"), "{html}");
    }
}

#[test]
fn test_incremental_renderer_over_growing_stream() {
    let session = session_from_chunks(&[BODY.as_bytes()]);
    let full = session.text();

    let mut renderer = IncrementalMarkdownRenderer::new();
    let mut grown = String::new();
    for c in full.chars() {
        grown.push(c);
        let html = renderer.render(&grown).to_string();
        assert_eq!(html, render(&grown));
        assert_only_allowed_markup(&html);
    }
}
