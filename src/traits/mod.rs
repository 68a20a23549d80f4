//! Trait abstractions for dependency injection and testability.
//!
//! - [`HttpClient`] - streaming HTTP POST used to open a job's progress stream

pub mod http;

pub use http::{ByteStream, Headers, HttpClient, HttpError};
