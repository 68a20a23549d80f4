//! Adapter implementations of the trait abstractions.
//!
//! - [`ReqwestHttpClient`] - production streaming transport
//! - [`mock::MockHttpClient`] - scripted transport for tests

pub mod mock;
pub mod reqwest_http;

pub use reqwest_http::ReqwestHttpClient;
