//! Error types for the job stream client.
//!
//! Transport-level failures are reported by the [`HttpClient`] trait as
//! [`HttpError`](crate::traits::HttpError). The session translates every
//! failure into a single terminal [`StreamError`], which is the only error
//! a caller ever observes from a running session.
//!
//! | Variant | Source | Terminal state |
//! |---------|--------|----------------|
//! | `HttpStatus`, `NoBody`, `Network` | start request | Failed |
//! | `Interrupted`, `LineTooLong`, `ClosedEarly` | read loop | Failed |
//! | `Backend` | error payload | Failed |
//! | `Cancelled` | cancel handle | Cancelled |
//!
//! [`HttpClient`]: crate::traits::HttpClient

mod stream;

pub use stream::StreamError;
