//! Job event types.
//!
//! A progress stream carries three kinds of semantic events. They are a
//! closed set: every classified line becomes exactly one [`JobEvent`]
//! variant, and dispatch matches on it exhaustively.

use serde::{Deserialize, Serialize};

use crate::error::StreamError;

/// Literal that prefixes every event line on the wire.
pub const EVENT_PREFIX: &str = "data:";

/// Payload that ends the stream successfully without producing an event.
pub const SENTINEL: &str = "__EOF__";

/// A non-terminal progress update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Pipeline stage, e.g. `clone` or `embed`
    pub stage: String,
    /// Human-readable description of the current step
    pub message: String,
    /// Units of work done so far
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    /// Total units of work, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
}

impl ProgressEvent {
    pub fn new(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            message: message.into(),
            progress: None,
            total: None,
        }
    }

    pub fn with_counts(mut self, progress: f64, total: f64) -> Self {
        self.progress = Some(progress);
        self.total = Some(total);
        self
    }

    /// Completed fraction in `[0, 1]`, when both counts are known.
    pub fn fraction(&self) -> Option<f64> {
        match (self.progress, self.total) {
            (Some(done), Some(total)) if total > 0.0 && done.is_finite() => {
                Some((done / total).clamp(0.0, 1.0))
            }
            _ => None,
        }
    }
}

/// Terminal status values of a finished job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    /// The job indexed the repository
    Completed,
    /// Nothing to do, e.g. the commit was already indexed
    Skipped,
    /// Another job holds the repository lock
    Locked,
}

impl ResultStatus {
    /// Parse a wire `status` value; non-terminal values yield `None`.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "completed" => Some(ResultStatus::Completed),
            "skipped" => Some(ResultStatus::Skipped),
            "locked" => Some(ResultStatus::Locked),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResultStatus::Completed => "completed",
            ResultStatus::Skipped => "skipped",
            ResultStatus::Locked => "locked",
        }
    }
}

/// The terminal result of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResult {
    pub status: ResultStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files_indexed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_hash: Option<String>,
}

impl JobResult {
    /// Message of the result synthesized when the stream ends on the sentinel.
    pub const STREAM_ENDED: &'static str = "Stream ended";

    pub fn new(status: ResultStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            files_indexed: None,
            branch: None,
            commit_hash: None,
        }
    }

    /// The completion notice used when only the sentinel was seen.
    pub fn stream_ended() -> Self {
        Self::new(ResultStatus::Completed, Self::STREAM_ENDED)
    }
}

/// A classified event from the progress stream.
#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    Progress(ProgressEvent),
    Result(JobResult),
    StreamError(StreamError),
}

impl JobEvent {
    /// Whether this event ends the session.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobEvent::Progress(_))
    }
}
