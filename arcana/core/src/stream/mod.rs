//! Interpretation Streams
//!
//! The reading server answers each interpretation request with a chunked
//! body of newline-delimited events:
//!
//! ```text
//! data: {"content":"The Tower "}
//! data: {"content":"reversed suggests..."}
//! data: {"error":"model overloaded"}
//! data: {"done":true}
//! ```
//!
//! Each event may carry `content` (appended to the text), `error` (shown
//! inline, the stream keeps going) and `done` (end of stream). Network
//! chunks can split lines anywhere, including inside a multi-byte character.
//!
//! # Layers
//!
//! - [`LineAssembler`] / [`decode_line`]: framing
//! - [`StreamConsumer`]: chunk-boundary invariant bytes-to-updates
//! - [`StreamSession`]: the append-only text of one request
//! - [`StreamHandle`]: the spawned network task and its update channel
//! - [`LiveSession`]: a handle, its session and rendered markdown together

mod consumer;
mod frame;
mod live;
mod session;

pub use consumer::{pump, StreamConsumer, StreamUpdate};
pub use frame::{decode_line, EventPayload, LineAssembler, DATA_PREFIX};
pub use live::LiveSession;
pub use session::{StreamSession, StreamState};

use std::fmt;

use futures::Stream;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::task::JoinHandle;

/// Buffered updates between the network task and the consumer
pub const UPDATE_CHANNEL_CAPACITY: usize = 100;

/// Owns the task reading one interpretation stream
///
/// Dropping the handle aborts the task, which releases the network read.
#[derive(Debug)]
pub struct StreamHandle {
    rx: mpsc::Receiver<StreamUpdate>,
    task: JoinHandle<()>,
}

impl StreamHandle {
    /// Spawn [`pump`] over `stream` on the current runtime
    pub fn spawn<S, B, E>(stream: S) -> Self
    where
        S: Stream<Item = Result<B, E>> + Send + 'static,
        B: AsRef<[u8]> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(UPDATE_CHANNEL_CAPACITY);
        let task = tokio::spawn(pump(stream, tx));
        Self { rx, task }
    }

    /// Wait for the next update; `None` once the task has finished
    pub async fn recv(&mut self) -> Option<StreamUpdate> {
        self.rx.recv().await
    }

    /// Take an update if one is ready
    ///
    /// # Errors
    ///
    /// [`TryRecvError::Empty`] when nothing is buffered yet,
    /// [`TryRecvError::Disconnected`] once the task is gone.
    pub fn try_recv(&mut self) -> Result<StreamUpdate, TryRecvError> {
        self.rx.try_recv()
    }

    /// Stop reading the stream
    pub fn abort(&self) {
        self.task.abort();
    }

    /// Whether the network task has exited
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
