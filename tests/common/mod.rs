//! Common test utilities for integration tests.
//!
//! Builders for wire-format event lines and helpers that run a session over
//! scripted chunks.

#![allow(dead_code)]

use std::sync::Arc;

use jobstream::adapters::mock::{BodyEnd, MockHttpClient, MockResponse, RecordingHandler};
use jobstream::client::{IndexRequest, IndexingClient};
use jobstream::session::{SessionOutcome, StreamSession};

pub const TEST_TOKEN: &str = "test-token-12345";
pub const TEST_REPO: &str = "repo-1";

/// One framed event line with its blank separator.
pub fn event(payload: &str) -> String {
    format!("data: {}\n\n", payload)
}

pub fn progress(stage: &str, message: &str) -> String {
    event(&format!(
        r#"{{"type":"progress","stage":"{}","message":"{}"}}"#,
        stage, message
    ))
}

pub fn completed(message: &str, files: u64) -> String {
    event(&format!(
        r#"{{"status":"completed","message":"{}","filesIndexed":{}}}"#,
        message, files
    ))
}

pub fn sentinel() -> String {
    event("__EOF__")
}

pub fn test_request() -> IndexRequest {
    IndexRequest::new(TEST_REPO, TEST_TOKEN)
}

/// Run a full session whose body is delivered as `chunks`.
pub async fn run_chunks(chunks: Vec<Vec<u8>>) -> (SessionOutcome, RecordingHandler) {
    let response = MockResponse::Body(
        chunks.into_iter().map(bytes::Bytes::from).collect(),
        BodyEnd::Close,
    );
    let client = IndexingClient::new(
        "http://api.test",
        Arc::new(MockHttpClient::with_default(response)),
    );
    let mut handler = RecordingHandler::new();
    let outcome = StreamSession::new()
        .run(&client, &test_request(), &mut handler)
        .await;
    (outcome, handler)
}

/// Split `bytes` into chunks of the given sizes (cycled), covering all input.
pub fn split_cyclic(bytes: &[u8], sizes: &[usize]) -> Vec<Vec<u8>> {
    let mut chunks = Vec::new();
    let mut offset = 0;
    let mut i = 0;
    while offset < bytes.len() {
        let size = sizes[i % sizes.len()].max(1);
        let end = (offset + size).min(bytes.len());
        chunks.push(bytes[offset..end].to_vec());
        offset = end;
        i += 1;
    }
    chunks
}
