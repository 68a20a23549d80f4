//! Streaming session lifecycle.
//!
//! A [`StreamSession`] drives one progress stream from the start request to
//! its single terminal notification:
//!
//! ```text
//! Idle ──open──▶ Active ──result / sentinel──▶ Completed
//!   │               ├──error event / transport──▶ Failed
//!   │               └──cancel──▶ Cancelled
//!   └──open failed / cancelled before open──▶ Failed / Cancelled
//! ```
//!
//! The read loop is the only owner of the decode state. The only value
//! shared with other tasks is the [`CancelHandle`], which carries the
//! cancellation token and the atomic lifecycle state.

mod handler;
mod state;

pub use handler::{ChannelHandler, ProgressHandler, SessionMessage};
pub use state::{SessionState, SessionStateCell};

use std::sync::Arc;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::client::{IndexRequest, IndexingClient};
use crate::config::StreamConfig;
use crate::error::StreamError;
use crate::sse::{event_stream, JobEvent, JobResult, DEFAULT_MAX_LINE_BYTES};
use crate::traits::ByteStream;

/// How a session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    /// A result event or the end-of-stream marker was received
    Completed(JobResult),
    /// The stream could not be opened, broke, or reported an error
    Failed(StreamError),
    /// The caller cancelled the session
    Cancelled,
}

impl SessionOutcome {
    /// The terminal state this outcome corresponds to.
    pub fn state(&self) -> SessionState {
        match self {
            SessionOutcome::Completed(_) => SessionState::Completed,
            SessionOutcome::Failed(_) => SessionState::Failed,
            SessionOutcome::Cancelled => SessionState::Cancelled,
        }
    }

    pub fn result(&self) -> Option<&JobResult> {
        match self {
            SessionOutcome::Completed(result) => Some(result),
            _ => None,
        }
    }

    fn from_error(err: StreamError) -> Self {
        if err.is_cancellation() {
            SessionOutcome::Cancelled
        } else {
            SessionOutcome::Failed(err)
        }
    }
}

/// Clonable handle for cancelling a session from another task.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    token: CancellationToken,
    state: Arc<SessionStateCell>,
}

impl CancelHandle {
    /// Request cancellation. Idempotent; a no-op once the session ended.
    pub fn cancel(&self) {
        if self.state.load().is_terminal() {
            return;
        }
        tracing::debug!("Cancellation requested");
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Current lifecycle state of the session.
    pub fn state(&self) -> SessionState {
        self.state.load()
    }
}

/// One progress stream, from start request to terminal notification.
#[derive(Debug)]
pub struct StreamSession {
    token: CancellationToken,
    state: Arc<SessionStateCell>,
    max_line_bytes: usize,
}

impl Default for StreamSession {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamSession {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            state: Arc::new(SessionStateCell::new()),
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }

    pub fn from_config(config: &StreamConfig) -> Self {
        Self::new().with_max_line_bytes(config.max_line_bytes)
    }

    pub fn with_max_line_bytes(mut self, max: usize) -> Self {
        self.max_line_bytes = max;
        self
    }

    /// Handle for cancelling this session from elsewhere.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            token: self.token.clone(),
            state: Arc::clone(&self.state),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.load()
    }

    /// Open the stream for `request` and read it to the end.
    ///
    /// `handler` receives zero or more progress notifications followed by
    /// exactly one result or error notification. The same terminal outcome
    /// is returned.
    #[tracing::instrument(skip_all, fields(resource = %request.resource_id))]
    pub async fn run<H>(
        self,
        client: &IndexingClient,
        request: &IndexRequest,
        handler: &mut H,
    ) -> SessionOutcome
    where
        H: ProgressHandler + ?Sized,
    {
        if self.token.is_cancelled() {
            return self.conclude(SessionOutcome::Cancelled, handler);
        }

        let opened = tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(StreamError::Cancelled),
            result = client.open(request) => result,
        };

        match opened {
            Ok(body) => self.read(body, handler).await,
            // A transport failure that raced with cancellation reports the cancellation
            Err(_) if self.token.is_cancelled() => {
                self.conclude(SessionOutcome::Cancelled, handler)
            }
            Err(err) => self.conclude(SessionOutcome::from_error(err), handler),
        }
    }

    /// Read an already opened body to the end.
    pub async fn read<H>(self, body: ByteStream, handler: &mut H) -> SessionOutcome
    where
        H: ProgressHandler + ?Sized,
    {
        let activated = self.state.activate();
        debug_assert!(activated, "session read twice");
        tracing::info!("Progress stream active");

        let mut events = Box::pin(event_stream(body, self.max_line_bytes));
        let mut progress_count = 0usize;

        let outcome = loop {
            let next = tokio::select! {
                biased;
                _ = self.token.cancelled() => break SessionOutcome::Cancelled,
                next = events.next() => next,
            };
            // A chunk may have been read while cancellation was requested
            if self.token.is_cancelled() {
                break SessionOutcome::Cancelled;
            }

            match next {
                Some(JobEvent::Progress(progress)) => {
                    progress_count += 1;
                    handler.on_progress(&progress);
                }
                Some(JobEvent::Result(result)) => break SessionOutcome::Completed(result),
                Some(JobEvent::StreamError(err)) => break SessionOutcome::from_error(err),
                None => break SessionOutcome::Failed(StreamError::ClosedEarly),
            }
        };

        drop(events);
        tracing::debug!(progress_events = progress_count, "Progress stream closed");
        self.conclude(outcome, handler)
    }

    /// Perform the terminal transition and notify the handler once.
    fn conclude<H>(self, outcome: SessionOutcome, handler: &mut H) -> SessionOutcome
    where
        H: ProgressHandler + ?Sized,
    {
        if !self.state.finish(outcome.state()) {
            tracing::debug!(state = %self.state.load(), "Session already ended");
            return outcome;
        }

        match &outcome {
            SessionOutcome::Completed(result) => {
                tracing::info!(status = result.status.as_str(), "Indexing finished");
                handler.on_result(result);
            }
            SessionOutcome::Failed(err) => {
                tracing::warn!(code = err.error_code(), error = %err, "Indexing stream failed");
                handler.on_error(err);
            }
            SessionOutcome::Cancelled => {
                tracing::info!("Indexing stream cancelled");
                handler.on_error(&StreamError::Cancelled);
            }
        }
        outcome
    }
}
