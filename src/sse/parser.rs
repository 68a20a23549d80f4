//! Event line classification.
//!
//! Turns one complete line into a [`LineOutcome`]: ignored, the end-of-stream
//! sentinel, a malformed payload, or a typed [`JobEvent`].

use crate::error::StreamError;
use crate::sse::events::{
    JobEvent, JobResult, ProgressEvent, ResultStatus, EVENT_PREFIX, SENTINEL,
};
use crate::sse::payloads::EventPayload;

/// What a single line means to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    /// Not an event line (keep-alive, comment, separator)
    Ignored,
    /// The stream ended normally
    Sentinel,
    /// An event line whose payload could not be parsed
    Malformed { payload: String, reason: String },
    /// A classified event
    Event(JobEvent),
}

/// Extract the trimmed payload of an event line.
///
/// Returns `None` for lines without the event prefix.
pub fn event_payload(line: &str) -> Option<&str> {
    line.strip_prefix(EVENT_PREFIX).map(str::trim)
}

/// Classify one complete line.
pub fn classify_line(line: &str) -> LineOutcome {
    match event_payload(line) {
        Some(payload) => classify_payload(payload),
        None => LineOutcome::Ignored,
    }
}

/// Classify the payload of an event line.
pub fn classify_payload(payload: &str) -> LineOutcome {
    if payload == SENTINEL {
        return LineOutcome::Sentinel;
    }

    let value: serde_json::Value = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(e) => return malformed(payload, e.to_string()),
    };
    match value.as_object() {
        Some(object) => LineOutcome::Event(classify_event(EventPayload::from_object(object))),
        None => malformed(payload, "payload is not a JSON object".to_string()),
    }
}

fn classify_event(payload: EventPayload) -> JobEvent {
    if let Some(status) = payload.status.as_deref().and_then(ResultStatus::from_wire) {
        return JobEvent::Result(JobResult {
            status,
            message: payload.message.unwrap_or_default(),
            files_indexed: payload.files_indexed,
            branch: payload.branch,
            commit_hash: payload.commit_hash,
        });
    }

    if payload.is_error() {
        return JobEvent::StreamError(StreamError::Backend {
            message: payload
                .message
                .unwrap_or_else(|| StreamError::BACKEND_FALLBACK.to_string()),
        });
    }

    JobEvent::Progress(ProgressEvent {
        stage: payload.stage.unwrap_or_default(),
        message: payload.message.unwrap_or_default(),
        progress: payload.progress,
        total: payload.total,
    })
}

fn malformed(payload: &str, reason: String) -> LineOutcome {
    LineOutcome::Malformed {
        payload: payload.to_string(),
        reason,
    }
}
