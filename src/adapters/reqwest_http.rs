//! reqwest transport for progress streams.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{RequestBuilder, Response};

use crate::traits::{ByteStream, Headers, HttpClient, HttpError};

/// [`HttpClient`] backed by a shared `reqwest::Client`.
///
/// Only the connect phase has a timeout. A progress stream stays open for as
/// long as the job runs, so no overall request timeout is set.
#[derive(Debug, Clone, Default)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    /// Wrap an already configured client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Build a client that gives up connecting after `timeout`.
    pub fn with_connect_timeout(timeout: Duration) -> Result<Self, HttpError> {
        reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()
            .map(Self::from_client)
            .map_err(|e| HttpError::Request(e.to_string()))
    }

    fn request(&self, url: &str, body: &str, headers: &Headers) -> RequestBuilder {
        headers.iter().fold(
            self.client.post(url).body(body.to_owned()),
            |builder, (name, value)| builder.header(name.as_str(), value.as_str()),
        )
    }
}

fn send_error(err: reqwest::Error) -> HttpError {
    if err.is_timeout() {
        HttpError::Timeout(err.to_string())
    } else if err.is_connect() {
        HttpError::Connect(err.to_string())
    } else {
        HttpError::Request(err.to_string())
    }
}

fn read_error(err: reqwest::Error) -> HttpError {
    if err.is_timeout() {
        HttpError::Timeout(err.to_string())
    } else {
        HttpError::Read(err.to_string())
    }
}

/// Drain a rejected response so the status body reaches the caller.
async fn rejection(response: Response) -> HttpError {
    let status = response.status().as_u16();
    let body = match response.text().await {
        Ok(text) => text,
        Err(e) => {
            tracing::debug!(status, error = %e, "Could not read error response body");
            String::new()
        }
    };
    HttpError::Status { status, body }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<ByteStream, HttpError> {
        let response = self
            .request(url, body, headers)
            .send()
            .await
            .map_err(send_error)?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        if response.content_length() == Some(0) {
            return Err(HttpError::EmptyBody);
        }

        tracing::debug!(status = response.status().as_u16(), "Progress stream opened");
        Ok(Box::pin(
            response
                .bytes_stream()
                .map(|chunk| chunk.map_err(read_error)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_request_carries_headers_and_body() {
        let mut headers = Headers::new();
        headers.insert("Accept".to_string(), "text/event-stream".to_string());
        headers.insert("Authorization".to_string(), "Bearer token".to_string());

        let request = ReqwestHttpClient::default()
            .request("https://example.com/index", "{}", &headers)
            .build()
            .unwrap();
        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.headers()["accept"], "text/event-stream");
        assert_eq!(request.headers()["authorization"], "Bearer token");
        assert_eq!(request.body().and_then(|b| b.as_bytes()), Some(&b"{}"[..]));
    }

    #[tokio::test]
    async fn test_rejected_status_keeps_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(409).set_body_string("already running"))
            .mount(&server)
            .await;

        let result = ReqwestHttpClient::default()
            .post_stream(&server.uri(), "{}", &Headers::new())
            .await;
        assert_eq!(
            result.err(),
            Some(HttpError::Status {
                status: 409,
                body: "already running".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_empty_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let result = ReqwestHttpClient::default()
            .post_stream(&server.uri(), "{}", &Headers::new())
            .await;
        assert_eq!(result.err(), Some(HttpError::EmptyBody));
    }

    #[tokio::test]
    async fn test_body_is_streamed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("Accept", "text/event-stream"))
            .respond_with(ResponseTemplate::new(200).set_body_string("data: __EOF__\n\n"))
            .mount(&server)
            .await;

        let mut headers = Headers::new();
        headers.insert("Accept".to_string(), "text/event-stream".to_string());
        let body = ReqwestHttpClient::default()
            .post_stream(&server.uri(), "{}", &headers)
            .await
            .unwrap();

        let bytes: Vec<u8> = body
            .map(|chunk| chunk.unwrap().to_vec())
            .concat()
            .await;
        assert_eq!(bytes, b"data: __EOF__\n\n");
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let client = ReqwestHttpClient::with_connect_timeout(Duration::from_secs(2)).unwrap();
        let result = client
            .post_stream("http://127.0.0.1:59999/index", "{}", &Headers::new())
            .await;
        assert!(matches!(
            result.err(),
            Some(HttpError::Connect(_)) | Some(HttpError::Timeout(_))
        ));
    }
}
