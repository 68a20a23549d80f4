//! Terminal stream error types.
//!
//! Every failure path of a session (transport, framing, explicit error
//! payloads, cancellation) resolves to exactly one [`StreamError`]. Its
//! `Display` output is the message surfaced to the caller's error handler.

use std::fmt;

use crate::traits::HttpError;

/// Terminal error variants of a streaming session.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamError {
    /// The server answered the start request with a non-success status.
    HttpStatus {
        status: u16,
        body: String,
    },

    /// The server accepted the request but sent no body to stream.
    NoBody,

    /// The request failed before any response arrived.
    Network {
        message: String,
    },

    /// The byte stream failed after it was opened.
    Interrupted {
        message: String,
    },

    /// A single event line grew past the configured limit.
    LineTooLong {
        limit: usize,
    },

    /// The job reported an error through an event payload.
    Backend {
        message: String,
    },

    /// The body ended without a result event or the end-of-stream marker.
    ClosedEarly,

    /// The caller cancelled the session.
    Cancelled,
}

impl StreamError {
    /// Fallback message for error payloads that carry no `message` field.
    pub const BACKEND_FALLBACK: &'static str = "Indexing failed";

    /// Build the error surfaced when opening the stream failed.
    pub fn from_open_failure(err: HttpError) -> Self {
        match err {
            HttpError::Status { status, body } => StreamError::HttpStatus { status, body },
            HttpError::EmptyBody => StreamError::NoBody,
            HttpError::Cancelled => StreamError::Cancelled,
            other => StreamError::Network {
                message: other.to_string(),
            },
        }
    }

    /// Build the error surfaced when the open byte stream yields an error.
    pub fn from_read_failure(err: HttpError) -> Self {
        match err {
            HttpError::Cancelled => StreamError::Cancelled,
            other => StreamError::Interrupted {
                message: other.to_string(),
            },
        }
    }

    /// The message delivered to the error handler.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Whether this error represents a caller-initiated cancellation rather
    /// than a failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, StreamError::Cancelled)
    }

    /// Whether the stream never started (no byte was read).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            StreamError::HttpStatus { .. } | StreamError::NoBody | StreamError::Network { .. }
        )
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::HttpStatus { status, .. } if *status == 401 || *status == 403 => {
                "You are not allowed to start indexing for this repository. Please sign in again."
                    .to_string()
            }
            StreamError::HttpStatus { status, .. } if *status == 409 => {
                "Another indexing job is already running for this repository.".to_string()
            }
            StreamError::HttpStatus { status, .. } => {
                format!("The server refused to start indexing (HTTP {}).", status)
            }
            StreamError::NoBody => {
                "The server accepted the request but sent no progress stream.".to_string()
            }
            StreamError::Network { .. } => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            StreamError::Interrupted { .. } => {
                "The connection dropped while indexing was in progress.".to_string()
            }
            StreamError::LineTooLong { .. } => {
                "The server sent an event that was too large to process.".to_string()
            }
            StreamError::Backend { message } => format!("Indexing failed: {}", message),
            StreamError::ClosedEarly => {
                "The server closed the progress stream before indexing finished.".to_string()
            }
            StreamError::Cancelled => "Indexing was cancelled.".to_string(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::HttpStatus { .. } => "E_STREAM_HTTP",
            StreamError::NoBody => "E_STREAM_NO_BODY",
            StreamError::Network { .. } => "E_STREAM_NETWORK",
            StreamError::Interrupted { .. } => "E_STREAM_INTERRUPTED",
            StreamError::LineTooLong { .. } => "E_STREAM_LINE",
            StreamError::Backend { .. } => "E_STREAM_BACKEND",
            StreamError::ClosedEarly => "E_STREAM_CLOSED",
            StreamError::Cancelled => "E_STREAM_CANCELLED",
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::HttpStatus { status, body } => {
                let body = body.trim();
                if body.is_empty() {
                    write!(f, "Failed to start indexing: {}", status)
                } else {
                    write!(f, "Failed to start indexing: {} {}", status, body)
                }
            }
            StreamError::NoBody => write!(f, "No response body"),
            StreamError::Network { message } => {
                write!(f, "Failed to start indexing: {}", message)
            }
            StreamError::Interrupted { message } => {
                write!(f, "Stream interrupted: {}", message)
            }
            StreamError::LineTooLong { limit } => {
                write!(f, "Event line exceeded {} bytes", limit)
            }
            StreamError::Backend { message } => write!(f, "{}", message),
            StreamError::ClosedEarly => write!(f, "Stream closed before indexing finished"),
            StreamError::Cancelled => write!(f, "Indexing cancelled"),
        }
    }
}

impl std::error::Error for StreamError {}
