//! Streaming transport seam.
//!
//! A session needs exactly one transport operation: send the start request
//! and hand back the response body as it arrives. Keeping it behind
//! [`HttpClient`] lets framing and lifecycle tests run without sockets.

use std::collections::HashMap;
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use thiserror::Error;

/// Request headers by name.
pub type Headers = HashMap<String, String>;

/// Response body, in whatever chunk sizes the transport delivers.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, HttpError>> + Send>>;

/// Transport failures, before or after the response headers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HttpError {
    #[error("could not connect: {0}")]
    Connect(String),

    #[error("timed out: {0}")]
    Timeout(String),

    /// Non-success status. `body` is the complete response text.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Success status but nothing to stream.
    #[error("No response body")]
    EmptyBody,

    /// Reading the body failed after the headers arrived.
    #[error("body read failed: {0}")]
    Read(String),

    /// The request could not be built or sent (bad URL, TLS setup, ...).
    #[error("invalid request: {0}")]
    Request(String),

    #[error("request cancelled")]
    Cancelled,
}

/// POST with a streamed response body.
///
/// ```ignore
/// use jobstream::traits::{Headers, HttpClient};
///
/// let body = http.post_stream("http://localhost:8000/api/repositories/r/index", "{}", &Headers::new()).await?;
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Send `body` to `url` and return the response body stream.
    ///
    /// A non-success status is reported as [`HttpError::Status`] after the
    /// body has been read in full. A success response that carries no body
    /// is [`HttpError::EmptyBody`].
    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<ByteStream, HttpError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display_includes_body() {
        let err = HttpError::Status {
            status: 409,
            body: "already running".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 409: already running");
    }

    #[test]
    fn test_read_display() {
        assert_eq!(
            HttpError::Read("connection reset".to_string()).to_string(),
            "body read failed: connection reset"
        );
        assert_eq!(HttpError::EmptyBody.to_string(), "No response body");
    }
}
