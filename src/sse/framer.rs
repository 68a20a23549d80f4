//! Newline framing of decoded text.
//!
//! Complete lines are emitted in order; the text after the last newline is
//! kept until more text arrives. The kept fragment is bounded so that a
//! server that never sends a newline cannot grow the buffer without limit.

use thiserror::Error;

/// Default upper bound for a single buffered line.
pub const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;

/// Framing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FramingError {
    /// The incomplete line grew past the limit
    #[error("line exceeded {limit} bytes without a newline")]
    LineTooLong { limit: usize },
}

/// Splits decoded text into newline-delimited lines.
#[derive(Debug)]
pub struct LineFramer {
    pending: String,
    max_line_bytes: usize,
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_BYTES)
    }
}

impl LineFramer {
    pub fn new(max_line_bytes: usize) -> Self {
        Self {
            pending: String::new(),
            max_line_bytes,
        }
    }

    /// Append text and move every line completed by it into `lines`.
    ///
    /// Lines are stored without the trailing `\n` or `\r\n`. On overflow the
    /// lines completed before the oversized one are still in `lines`.
    pub fn push(&mut self, text: &str, lines: &mut Vec<String>) -> Result<(), FramingError> {
        self.pending.push_str(text);

        let mut start = 0;
        let mut overflow = false;
        while let Some(offset) = self.pending[start..].find('\n') {
            let end = start + offset;
            let line = &self.pending[start..end];
            if line.len() > self.max_line_bytes {
                overflow = true;
                break;
            }
            lines.push(line.strip_suffix('\r').unwrap_or(line).to_string());
            start = end + 1;
        }
        self.pending.drain(..start);

        if overflow || self.pending.len() > self.max_line_bytes {
            return Err(FramingError::LineTooLong {
                limit: self.max_line_bytes,
            });
        }
        Ok(())
    }

    /// Take the final fragment at stream end, if any.
    pub fn finish(&mut self) -> Option<String> {
        let fragment = std::mem::take(&mut self.pending);
        let line = fragment.strip_suffix('\r').unwrap_or(&fragment);
        if line.is_empty() {
            None
        } else {
            Some(line.to_string())
        }
    }

    /// Length of the buffered incomplete line.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
