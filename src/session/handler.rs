//! Notification sinks for a running session.

use tokio::sync::mpsc;

use crate::error::StreamError;
use crate::sse::{JobResult, ProgressEvent};

/// Receives the notifications of one session.
///
/// Calls happen synchronously on the read loop's task. `on_progress` may be
/// called any number of times; exactly one of `on_result` or `on_error` is
/// called last.
pub trait ProgressHandler {
    fn on_progress(&mut self, event: &ProgressEvent);

    fn on_result(&mut self, result: &JobResult);

    /// Also called for cancellation, with [`StreamError::Cancelled`].
    fn on_error(&mut self, error: &StreamError);
}

/// A session notification as a value.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionMessage {
    Progress(ProgressEvent),
    Result(JobResult),
    Error(StreamError),
}

impl SessionMessage {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionMessage::Progress(_))
    }
}

/// Forwards notifications to another task over an unbounded channel.
///
/// A dropped receiver is not an error; the session still runs to its end.
#[derive(Debug, Clone)]
pub struct ChannelHandler {
    tx: mpsc::UnboundedSender<SessionMessage>,
}

impl ChannelHandler {
    pub fn new(tx: mpsc::UnboundedSender<SessionMessage>) -> Self {
        Self { tx }
    }

    /// Create a handler together with the receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SessionMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    fn send(&self, message: SessionMessage) {
        let _ = self.tx.send(message);
    }
}

impl ProgressHandler for ChannelHandler {
    fn on_progress(&mut self, event: &ProgressEvent) {
        self.send(SessionMessage::Progress(event.clone()));
    }

    fn on_result(&mut self, result: &JobResult) {
        self.send(SessionMessage::Result(result.clone()));
    }

    fn on_error(&mut self, error: &StreamError) {
        self.send(SessionMessage::Error(error.clone()));
    }
}
