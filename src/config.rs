//! Client configuration.
//!
//! Built with the builder methods or read from the environment.

use std::time::Duration;

use thiserror::Error;

use crate::sse::DEFAULT_MAX_LINE_BYTES;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

pub const ENV_BASE_URL: &str = "JOBSTREAM_BASE_URL";
pub const ENV_TOKEN: &str = "JOBSTREAM_TOKEN";
pub const ENV_MAX_LINE_BYTES: &str = "JOBSTREAM_MAX_LINE_BYTES";
pub const ENV_CONNECT_TIMEOUT_SECS: &str = "JOBSTREAM_CONNECT_TIMEOUT_SECS";

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    MissingToken(&'static str),

    #[error("invalid value {value:?} for {key}: expected a positive integer")]
    InvalidNumber { key: &'static str, value: String },
}

/// Configuration for opening and reading progress streams.
///
/// # Example
///
/// ```ignore
/// use jobstream::config::StreamConfig;
///
/// let config = StreamConfig::default()
///     .with_base_url("https://api.example.com")
///     .with_token("secret");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfig {
    /// API base URL without a trailing slash
    pub base_url: String,
    /// Bearer token sent with the start request
    pub token: Option<String>,
    /// Upper bound for a single buffered event line
    pub max_line_bytes: usize,
    /// Connect timeout for the start request
    pub connect_timeout: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

impl StreamConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API base URL. A trailing slash is removed.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_max_line_bytes(mut self, max: usize) -> Self {
        self.max_line_bytes = max;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// The bearer token, or an error naming the variable to set.
    pub fn require_token(&self) -> Result<&str, ConfigError> {
        self.token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingToken(ENV_TOKEN))
    }

    /// Create config from the `JOBSTREAM_*` environment variables.
    ///
    /// Unset variables keep their defaults; malformed numbers are errors.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            config = config.with_base_url(url.trim());
        }
        if let Some(token) = lookup(ENV_TOKEN).filter(|v| !v.trim().is_empty()) {
            config = config.with_token(token.trim());
        }
        if let Some(raw) = lookup(ENV_MAX_LINE_BYTES) {
            config.max_line_bytes = parse_positive(ENV_MAX_LINE_BYTES, &raw)? as usize;
        }
        if let Some(raw) = lookup(ENV_CONNECT_TIMEOUT_SECS) {
            config.connect_timeout =
                Duration::from_secs(parse_positive(ENV_CONNECT_TIMEOUT_SECS, &raw)?);
        }

        Ok(config)
    }
}

fn parse_positive(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::InvalidNumber {
            key,
            value: raw.to_string(),
        }),
    }
}
