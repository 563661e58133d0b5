//! Stream consumption
//!
//! [`StreamConsumer`] is the pure part: bytes in, [`StreamUpdate`]s out.
//! [`pump`] drives it from an async byte stream and forwards the updates over
//! a channel, which is what the HTTP backend spawns per request.

use std::fmt;

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use super::frame::{decode_line, LineAssembler};

/// One change to apply to a [`StreamSession`](super::StreamSession)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamUpdate {
    /// Text to append
    Content(String),
    /// Server-reported problem, appended inline; the stream continues
    Warning(String),
    /// The stream finished
    Done,
    /// The transport failed; the stream is over
    Failed(String),
}

impl StreamUpdate {
    /// Whether no further updates follow this one
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed(_))
    }
}

/// Turns raw chunks of the event protocol into updates
///
/// The output does not depend on how the input bytes are split into chunks.
#[derive(Debug, Default)]
pub struct StreamConsumer {
    lines: LineAssembler,
    finished: bool,
    dropped: usize,
}

impl StreamConsumer {
    /// Create a consumer at the start of a stream
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one network chunk
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<StreamUpdate> {
        if self.finished {
            return Vec::new();
        }
        let mut updates = Vec::new();
        for line in self.lines.push(chunk) {
            self.process_line(&line, &mut updates);
            if self.finished {
                break;
            }
        }
        updates
    }

    /// The transport ended cleanly
    ///
    /// A trailing line without its newline is still processed. If no `done`
    /// event arrived, the stream is finalized as done anyway.
    pub fn end_of_stream(&mut self) -> Vec<StreamUpdate> {
        if self.finished {
            return Vec::new();
        }
        let mut updates = Vec::new();
        if let Some(line) = self.lines.finish() {
            self.process_line(&line, &mut updates);
        }
        if !self.finished {
            self.finished = true;
            updates.push(StreamUpdate::Done);
        }
        updates
    }

    /// The transport failed mid-stream
    pub fn fail(&mut self, reason: impl Into<String>) -> Option<StreamUpdate> {
        if self.finished {
            return None;
        }
        self.finished = true;
        Some(StreamUpdate::Failed(reason.into()))
    }

    /// Whether a terminal update has been produced
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Non-empty lines discarded as malformed so far
    #[must_use]
    pub fn dropped_lines(&self) -> usize {
        self.dropped
    }

    fn process_line(&mut self, line: &str, updates: &mut Vec<StreamUpdate>) {
        if line.is_empty() {
            return;
        }
        let Some(payload) = decode_line(line) else {
            trace!(line, "Dropping malformed event line");
            self.dropped += 1;
            return;
        };

        if let Some(content) = payload.content {
            updates.push(StreamUpdate::Content(content));
        }
        if let Some(error) = payload.error {
            updates.push(StreamUpdate::Warning(error));
        }
        if payload.done {
            self.finished = true;
            updates.push(StreamUpdate::Done);
        }
    }
}

/// Read `stream` to the end, forwarding updates to `tx`
///
/// Returns early once a terminal update is sent or the receiver is gone.
/// Transport errors become a [`StreamUpdate::Failed`].
pub async fn pump<S, B, E>(stream: S, tx: mpsc::Sender<StreamUpdate>)
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: fmt::Display,
{
    let mut stream = std::pin::pin!(stream);
    let mut consumer = StreamConsumer::new();

    while let Some(chunk) = stream.next().await {
        let updates = match chunk {
            Ok(bytes) => consumer.feed(bytes.as_ref()),
            Err(e) => {
                warn!(error = %e, "Interpretation stream failed");
                consumer.fail(e.to_string()).into_iter().collect()
            }
        };

        for update in updates {
            if tx.send(update).await.is_err() {
                debug!("Stream receiver dropped, stopping");
                return;
            }
        }
        if consumer.is_finished() {
            return;
        }
    }

    for update in consumer.end_of_stream() {
        if tx.send(update).await.is_err() {
            return;
        }
    }
    if consumer.dropped_lines() > 0 {
        debug!(dropped = consumer.dropped_lines(), "Stream ended with malformed lines");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_mid_line() {
        let mut consumer = StreamConsumer::new();
        let mut updates = consumer.feed(b"data: {\"content\":\"A\"}\ndata: {\"con");
        updates.extend(consumer.feed(b"tent\":\"B\"}\ndata: {\"done\":true}\n"));

        assert_eq!(
            updates,
            vec![
                StreamUpdate::Content("A".into()),
                StreamUpdate::Content("B".into()),
                StreamUpdate::Done,
            ]
        );
        assert!(consumer.is_finished());
    }

    #[test]
    fn test_malformed_lines_are_dropped() {
        let mut consumer = StreamConsumer::new();
        let updates = consumer.feed(b"garbage\ndata: {oops\n\ndata: {\"content\":\"ok\"}\n");
        assert_eq!(updates, vec![StreamUpdate::Content("ok".into())]);
        assert_eq!(consumer.dropped_lines(), 2);
    }

    #[test]
    fn test_warning_precedes_done_in_one_event() {
        let mut consumer = StreamConsumer::new();
        let updates = consumer.feed(b"data: {\"content\":\"x\",\"error\":\"e\",\"done\":true}\n");
        assert_eq!(
            updates,
            vec![
                StreamUpdate::Content("x".into()),
                StreamUpdate::Warning("e".into()),
                StreamUpdate::Done,
            ]
        );
    }

    #[test]
    fn test_nothing_after_done() {
        let mut consumer = StreamConsumer::new();
        let updates = consumer.feed(b"data: {\"done\":true}\ndata: {\"content\":\"late\"}\n");
        assert_eq!(updates, vec![StreamUpdate::Done]);
        assert!(consumer.feed(b"data: {\"content\":\"later\"}\n").is_empty());
        assert!(consumer.end_of_stream().is_empty());
    }

    #[test]
    fn test_end_without_done_finalizes() {
        let mut consumer = StreamConsumer::new();
        let mut updates = consumer.feed(b"data: {\"content\":\"A\"}\ndata: {\"content\":\"B\"}");
        updates.extend(consumer.end_of_stream());
        assert_eq!(
            updates,
            vec![
                StreamUpdate::Content("A".into()),
                StreamUpdate::Content("B".into()),
                StreamUpdate::Done,
            ]
        );
    }

    #[tokio::test]
    async fn test_pump_reports_transport_error() {
        let chunks: Vec<Result<Vec<u8>, String>> = vec![
            Ok(b"data: {\"content\":\"partial\"}\n".to_vec()),
            Err("connection reset".to_string()),
            Ok(b"data: {\"content\":\"never\"}\n".to_vec()),
        ];
        let (tx, mut rx) = mpsc::channel(8);
        pump(futures::stream::iter(chunks), tx).await;

        assert_eq!(rx.recv().await, Some(StreamUpdate::Content("partial".into())));
        assert_eq!(
            rx.recv().await,
            Some(StreamUpdate::Failed("connection reset".into()))
        );
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_pump_stops_when_receiver_dropped() {
        let chunks: Vec<Result<&'static [u8], String>> = vec![
            Ok(&b"data: {\"content\":\"a\"}\n"[..]),
            Ok(&b"data: {\"content\":\"b\"}\n"[..]),
        ];
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        // Must return rather than block on a closed channel
        pump(futures::stream::iter(chunks), tx).await;
    }
}
