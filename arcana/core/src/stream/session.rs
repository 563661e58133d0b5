//! Per-request stream state

use super::StreamUpdate;

/// Lifecycle of a [`StreamSession`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StreamState {
    /// Still receiving
    #[default]
    Streaming,
    /// Finished normally (explicit `done` or end of transport)
    Done,
    /// The transport failed; the reason is appended to the buffer
    Failed,
}

/// Accumulated text of one interpretation request
///
/// The buffer only ever grows. Once the session finishes, further updates are
/// ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamSession {
    buffer: String,
    state: StreamState,
    error: Option<String>,
}

impl StreamSession {
    /// Create an empty, streaming session
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one update; returns whether anything changed
    pub fn apply(&mut self, update: StreamUpdate) -> bool {
        if self.is_finished() {
            return false;
        }

        match update {
            StreamUpdate::Content(text) => {
                if text.is_empty() {
                    return false;
                }
                self.buffer.push_str(&text);
            }
            StreamUpdate::Warning(message) => {
                self.buffer.push_str("\n\n⚠️ Error: ");
                self.buffer.push_str(&message);
                self.error = Some(message);
            }
            StreamUpdate::Done => {
                self.state = StreamState::Done;
            }
            StreamUpdate::Failed(reason) => {
                if !self.buffer.is_empty() {
                    self.buffer.push_str("\n\n");
                }
                self.buffer
                    .push_str("⚠️ Could not reach the reading server: ");
                self.buffer.push_str(&reason);
                self.error = Some(reason);
                self.state = StreamState::Failed;
            }
        }
        true
    }

    /// Text received so far
    #[must_use]
    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Whether the session has stopped accepting updates
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state != StreamState::Streaming
    }

    /// Whether the session ended normally
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.state == StreamState::Done
    }

    /// Most recent error or warning message
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
