//! Progress stream ingestion.
//!
//! The server writes one event per line, prefixed with `data:` and separated
//! by blank lines:
//!
//! ```text
//! data: {"type":"progress","stage":"clone","message":"Cloning"}
//!
//! data: {"status":"completed","message":"Indexed 120 files","filesIndexed":120}
//!
//! data: __EOF__
//! ```
//!
//! # Module structure
//! - `decoder` - incremental UTF-8 decoding across chunk boundaries
//! - `framer` - newline framing with a bounded pending line
//! - `events` - event type definitions (JobEvent, ProgressEvent, JobResult)
//! - `payloads` - internal payload deserialization structs
//! - `parser` - line classification (classify_line)
//! - `reader` - chunk-to-event state machine and `Stream` adapter

pub mod decoder;
pub mod framer;
mod events;
mod parser;
mod payloads;
mod reader;

pub use decoder::Utf8Decoder;
pub use events::{JobEvent, JobResult, ProgressEvent, ResultStatus, EVENT_PREFIX, SENTINEL};
pub use framer::{FramingError, LineFramer, DEFAULT_MAX_LINE_BYTES};
pub use parser::{classify_line, classify_payload, event_payload, LineOutcome};
pub use reader::{event_stream, EventReader};
