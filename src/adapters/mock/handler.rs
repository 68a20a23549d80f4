//! Recording progress handler for tests.

use crate::error::StreamError;
use crate::session::{ProgressHandler, SessionMessage};
use crate::sse::{JobResult, ProgressEvent};

/// Records every notification in arrival order.
///
/// Optionally runs a hook after each progress notification, which tests use
/// to cancel a session from inside the read loop.
#[derive(Default)]
pub struct RecordingHandler {
    messages: Vec<SessionMessage>,
    on_progress_hook: Option<Box<dyn FnMut(&ProgressEvent) + Send>>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `hook` after each recorded progress event.
    pub fn with_progress_hook(hook: impl FnMut(&ProgressEvent) + Send + 'static) -> Self {
        Self {
            messages: Vec::new(),
            on_progress_hook: Some(Box::new(hook)),
        }
    }

    pub fn messages(&self) -> &[SessionMessage] {
        &self.messages
    }

    pub fn progress(&self) -> Vec<&ProgressEvent> {
        self.messages
            .iter()
            .filter_map(|m| match m {
                SessionMessage::Progress(event) => Some(event),
                _ => None,
            })
            .collect()
    }

    pub fn results(&self) -> Vec<&JobResult> {
        self.messages
            .iter()
            .filter_map(|m| match m {
                SessionMessage::Result(result) => Some(result),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<&StreamError> {
        self.messages
            .iter()
            .filter_map(|m| match m {
                SessionMessage::Error(error) => Some(error),
                _ => None,
            })
            .collect()
    }

    /// Number of terminal notifications received.
    pub fn terminal_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_terminal()).count()
    }

    /// Whether the terminal notification, if any, is the last one.
    pub fn terminal_is_last(&self) -> bool {
        match self.messages.iter().position(|m| m.is_terminal()) {
            Some(index) => index == self.messages.len() - 1,
            None => true,
        }
    }
}

impl std::fmt::Debug for RecordingHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingHandler")
            .field("messages", &self.messages)
            .finish()
    }
}

impl ProgressHandler for RecordingHandler {
    fn on_progress(&mut self, event: &ProgressEvent) {
        self.messages.push(SessionMessage::Progress(event.clone()));
        if let Some(hook) = self.on_progress_hook.as_mut() {
            hook(event);
        }
    }

    fn on_result(&mut self, result: &JobResult) {
        self.messages.push(SessionMessage::Result(result.clone()));
    }

    fn on_error(&mut self, error: &StreamError) {
        self.messages.push(SessionMessage::Error(error.clone()));
    }
}
