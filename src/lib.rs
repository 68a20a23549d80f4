//! jobstream - live progress of server-side indexing jobs.
//!
//! Opens a job's progress stream over HTTP, frames and classifies its
//! events, and delivers them to a [`ProgressHandler`](session::ProgressHandler)
//! with support for cancellation.
//!
//! ```ignore
//! use jobstream::client::{IndexRequest, IndexingClient};
//! use jobstream::config::StreamConfig;
//! use jobstream::session::{ChannelHandler, StreamSession};
//!
//! let config = StreamConfig::from_env()?;
//! let client = IndexingClient::from_config(&config)?;
//! let request = IndexRequest::new("repo-1", config.require_token()?).with_branch("main");
//!
//! let session = StreamSession::from_config(&config);
//! let cancel = session.cancel_handle();
//! let (mut handler, mut messages) = ChannelHandler::channel();
//! let outcome = session.run(&client, &request, &mut handler).await;
//! ```

pub mod adapters;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;
pub mod sse;
pub mod traits;
