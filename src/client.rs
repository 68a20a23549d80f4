//! Indexing API client.
//!
//! Opens the progress stream of an indexing job. Everything after the
//! response headers is handled by [`StreamSession`](crate::session::StreamSession).

use std::sync::Arc;

use crate::adapters::ReqwestHttpClient;
use crate::config::StreamConfig;
use crate::error::StreamError;
use crate::traits::{ByteStream, Headers, HttpClient, HttpError};

/// Parameters of one indexing request.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRequest {
    /// Repository (resource) identifier
    pub resource_id: String,
    /// Branch to index; the server default when absent
    pub branch: Option<String>,
    /// Bearer token
    pub token: String,
}

impl IndexRequest {
    pub fn new(resource_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            branch: None,
            token: token.into(),
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }
}

/// Client for starting indexing jobs and opening their progress streams.
#[derive(Clone)]
pub struct IndexingClient {
    /// Base URL for the API
    pub base_url: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for IndexingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexingClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl IndexingClient {
    /// Create a client over any [`HttpClient`] implementation.
    pub fn new(base_url: impl Into<String>, http: Arc<dyn HttpClient>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    /// Create a reqwest-backed client from configuration.
    pub fn from_config(config: &StreamConfig) -> Result<Self, HttpError> {
        let http = ReqwestHttpClient::with_connect_timeout(config.connect_timeout)?;
        Ok(Self::new(config.base_url.clone(), Arc::new(http)))
    }

    /// URL of the indexing endpoint for a request.
    pub fn endpoint(&self, request: &IndexRequest) -> String {
        let mut url = format!(
            "{}/api/repositories/{}/index",
            self.base_url,
            urlencoding::encode(&request.resource_id)
        );
        if let Some(branch) = request.branch.as_deref().filter(|b| !b.is_empty()) {
            url.push_str("?branch=");
            url.push_str(&urlencoding::encode(branch));
        }
        url
    }

    /// Headers of the start request.
    pub fn headers(token: &str) -> Headers {
        let mut headers = Headers::new();
        headers.insert("Authorization".to_string(), format!("Bearer {}", token));
        headers.insert("Accept".to_string(), "text/event-stream".to_string());
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers
    }

    /// Start the job and return its progress body.
    ///
    /// Every failure is already translated into the terminal
    /// [`StreamError`] the caller should see.
    pub async fn open(&self, request: &IndexRequest) -> Result<ByteStream, StreamError> {
        let url = self.endpoint(request);
        tracing::debug!(%url, "Opening progress stream");

        self.http
            .post_stream(&url, "{}", &Self::headers(&request.token))
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Failed to open progress stream");
                StreamError::from_open_failure(e)
            })
    }
}
