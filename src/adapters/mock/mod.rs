//! Mock implementations for testing.
//!
//! - [`MockHttpClient`] - HTTP client with scripted streaming responses
//! - [`RecordingHandler`] - progress handler that records notifications

pub mod handler;
pub mod http;

pub use handler::RecordingHandler;
pub use http::{BodyEnd, MockHttpClient, MockResponse, RecordedRequest};
