//! A stream being watched by a surface

use tokio::sync::mpsc::error::TryRecvError;

use crate::markdown::IncrementalMarkdownRenderer;

use super::{StreamHandle, StreamSession, StreamUpdate};

/// One in-flight interpretation: network handle, text, and rendered HTML
///
/// Surfaces with their own event loop call [`LiveSession::poll`] once per
/// frame; async callers await [`LiveSession::next`]. The handle is released as
/// soon as the session finishes.
#[derive(Debug)]
pub struct LiveSession {
    handle: Option<StreamHandle>,
    session: StreamSession,
    renderer: IncrementalMarkdownRenderer,
}

impl LiveSession {
    /// Watch a freshly spawned stream
    #[must_use]
    pub fn new(handle: StreamHandle) -> Self {
        Self {
            handle: Some(handle),
            session: StreamSession::new(),
            renderer: IncrementalMarkdownRenderer::new(),
        }
    }

    /// A session whose request never got a response
    #[must_use]
    pub fn failed(reason: impl Into<String>) -> Self {
        let mut session = StreamSession::new();
        session.apply(StreamUpdate::Failed(reason.into()));
        Self {
            handle: None,
            session,
            renderer: IncrementalMarkdownRenderer::new(),
        }
    }

    /// Drain every update that is ready without waiting
    ///
    /// Returns whether the text or state changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Some(handle) = self.handle.as_mut() {
            match handle.try_recv() {
                Ok(update) => changed |= self.apply(update),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    changed |= self.apply(StreamUpdate::Done);
                    self.handle = None;
                }
            }
        }
        changed
    }

    /// Wait for the next update and apply it
    ///
    /// Returns `None` once the session is finished.
    pub async fn next(&mut self) -> Option<StreamUpdate> {
        let handle = self.handle.as_mut()?;
        let update = handle.recv().await.unwrap_or(StreamUpdate::Done);
        self.apply(update.clone());
        Some(update)
    }

    /// Wait until the session finishes
    pub async fn finish(&mut self) -> &StreamSession {
        while self.next().await.is_some() {}
        &self.session
    }

    /// Stop reading; the session keeps the text received so far and is done
    pub fn cancel(&mut self) {
        self.handle = None;
        self.session.apply(StreamUpdate::Done);
    }

    /// Session state and text
    #[must_use]
    pub fn session(&self) -> &StreamSession {
        &self.session
    }

    /// Text received so far
    #[must_use]
    pub fn text(&self) -> &str {
        self.session.text()
    }

    /// Whether the session is finished
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.session.is_finished()
    }

    /// Sanitized HTML of the text received so far
    pub fn html(&mut self) -> &str {
        self.renderer.render(self.session.text())
    }

    fn apply(&mut self, update: StreamUpdate) -> bool {
        let changed = self.session.apply(update);
        if self.session.is_finished() {
            self.handle = None;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    fn body(chunks: &[&str]) -> impl futures::Stream<Item = Result<Vec<u8>, Infallible>> {
        let owned: Vec<_> = chunks.iter().map(|c| Ok(c.as_bytes().to_vec())).collect();
        futures::stream::iter(owned)
    }

    #[tokio::test]
    async fn test_finish_collects_text() {
        let handle = StreamHandle::spawn(body(&[
            "data: {\"content\":\"## Hi\\n\"}\n",
            "data: {\"content\":\"**there**\"}\ndata: {\"done\":true}\n",
        ]));
        let mut live = LiveSession::new(handle);

        let session = live.finish().await;
        assert_eq!(session.text(), "## Hi\n**there**");
        assert!(session.is_done());
        assert_eq!(
            live.html(),
            "<h2 class=\"md-h2\">Hi</h2><strong>there</strong>"
        );
        assert_eq!(live.next().await, None);
    }

    #[tokio::test]
    async fn test_poll_after_stream_ends_without_done() {
        let handle = StreamHandle::spawn(body(&["data: {\"content\":\"partial\"}\n"]));
        let mut live = LiveSession::new(handle);

        for _ in 0..100 {
            live.poll();
            if live.is_finished() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(live.session().is_done());
        assert_eq!(live.text(), "partial");
    }

    #[test]
    fn test_failed_request() {
        let mut live = LiveSession::failed("connection refused");
        assert!(live.is_finished());
        assert!(!live.poll());
        assert!(live.html().contains("connection refused"));
    }
}
