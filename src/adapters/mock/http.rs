//! Scripted transport for session tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};

use crate::traits::{ByteStream, Headers, HttpClient, HttpError};

/// A start request as the transport saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub url: String,
    pub headers: Headers,
    pub body: String,
}

/// What happens after the scripted chunks have been delivered.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyEnd {
    /// The body ends normally
    Close,
    /// The body stays open until dropped
    Hang,
    /// The body yields this error
    Fail(HttpError),
}

/// Scripted reply to one start request.
#[derive(Debug, Clone, PartialEq)]
pub enum MockResponse {
    /// The request succeeds and the body delivers these chunks
    Body(Vec<Bytes>, BodyEnd),
    /// The request fails before a body is available
    Fail(HttpError),
    /// The request never completes
    Hang,
}

impl MockResponse {
    /// A body of string chunks that then closes.
    pub fn chunks<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MockResponse::Body(to_bytes(chunks), BodyEnd::Close)
    }

    /// A body of string chunks that then stays open.
    pub fn chunks_then_pending<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MockResponse::Body(to_bytes(chunks), BodyEnd::Hang)
    }

    /// A body of string chunks followed by a read error.
    pub fn chunks_then_error<I, S>(chunks: I, err: HttpError) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MockResponse::Body(to_bytes(chunks), BodyEnd::Fail(err))
    }

    fn into_body(chunks: Vec<Bytes>, end: BodyEnd) -> ByteStream {
        let delivered = stream::iter(chunks.into_iter().map(Ok::<Bytes, HttpError>));
        match end {
            BodyEnd::Close => Box::pin(delivered),
            BodyEnd::Hang => Box::pin(delivered.chain(stream::pending())),
            BodyEnd::Fail(err) => Box::pin(delivered.chain(stream::once(async move { Err(err) }))),
        }
    }
}

fn to_bytes<I, S>(chunks: I) -> Vec<Bytes>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    chunks
        .into_iter()
        .map(|chunk| Bytes::from(chunk.into()))
        .collect()
}

#[derive(Debug, Default)]
struct Script {
    queued: VecDeque<MockResponse>,
    fallback: Option<MockResponse>,
    requests: Vec<RecordedRequest>,
}

/// [`HttpClient`] that replays scripted responses.
///
/// Queued responses are used once each, in order; after that every request
/// gets the fallback. Clones share the script, so a test can keep one clone
/// for inspection after handing another to the client.
///
/// ```ignore
/// let mock = MockHttpClient::with_default(MockResponse::chunks(["data: __EOF__\n\n"]));
/// let client = IndexingClient::new("http://api.test", Arc::new(mock.clone()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    script: Arc<Mutex<Script>>,
}

impl MockHttpClient {
    /// A client with nothing scripted; every request fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// A client that answers every request with `response`.
    pub fn with_default(response: MockResponse) -> Self {
        let mock = Self::new();
        mock.script.lock().unwrap().fallback = Some(response);
        mock
    }

    /// Answer the next unanswered request with `response`.
    pub fn push_response(&self, response: MockResponse) {
        self.script.lock().unwrap().queued.push_back(response);
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.script.lock().unwrap().requests.clone()
    }

    fn next_response(&self, request: RecordedRequest) -> Option<MockResponse> {
        let mut script = self.script.lock().unwrap();
        script.requests.push(request);
        script.queued.pop_front().or_else(|| script.fallback.clone())
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<ByteStream, HttpError> {
        let response = self.next_response(RecordedRequest {
            url: url.to_string(),
            headers: headers.clone(),
            body: body.to_string(),
        });

        match response {
            Some(MockResponse::Body(chunks, end)) => Ok(MockResponse::into_body(chunks, end)),
            Some(MockResponse::Fail(err)) => Err(err),
            Some(MockResponse::Hang) => futures::future::pending().await,
            None => Err(HttpError::Request(format!("no scripted response for {}", url))),
        }
    }
}
