//! Wire payload field extraction.
//!
//! The server writes one JSON object after the event prefix. Only the
//! discriminants (`type`, `status`) decide what an event is; every other
//! field is read leniently, and a field of an unexpected JSON type is
//! treated as absent instead of invalidating the whole event.

use serde_json::{Map, Value};

/// Fields of one event object, as far as they could be read.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct EventPayload {
    pub kind: Option<String>,
    pub status: Option<String>,
    pub stage: Option<String>,
    pub message: Option<String>,
    pub progress: Option<f64>,
    pub total: Option<f64>,
    pub files_indexed: Option<u64>,
    pub branch: Option<String>,
    pub commit_hash: Option<String>,
}

impl EventPayload {
    pub fn from_object(object: &Map<String, Value>) -> Self {
        Self {
            kind: text(object, "type"),
            status: text(object, "status"),
            stage: text(object, "stage"),
            message: text(object, "message"),
            progress: number(object, "progress"),
            total: number(object, "total"),
            files_indexed: count(object, "filesIndexed"),
            branch: text(object, "branch"),
            commit_hash: text(object, "commitHash"),
        }
    }

    /// Whether the `type` or `status` discriminant marks an error.
    pub fn is_error(&self) -> bool {
        self.kind.as_deref() == Some("error") || self.status.as_deref() == Some("error")
    }
}

fn text(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key)?.as_str().map(str::to_string)
}

fn number(object: &Map<String, Value>, key: &str) -> Option<f64> {
    object.get(key)?.as_f64()
}

/// A non-negative whole number, whether written as `12`, `12.0` or `1.2e1`.
fn count(object: &Map<String, Value>, key: &str) -> Option<u64> {
    let value = object.get(key)?;
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|n| n.fract() == 0.0 && *n >= 0.0 && *n <= u64::MAX as f64)
            .map(|n| n as u64)
    })
}
