//! CLI module for jobstream.
//!
//! - Argument parsing
//! - Version display
//! - Terminal rendering of progress notifications
//!
//! ```ignore
//! use jobstream::cli::{parse_args, CliCommand};
//!
//! match parse_args(std::env::args())? {
//!     CliCommand::Run(args) => { /* start a session */ }
//!     _ => {}
//! }
//! ```

pub mod args;
pub mod render;
pub mod version;

pub use args::{parse_args, CliCommand, CliError, RunArgs, USAGE};
pub use render::TerminalHandler;
pub use version::{version_line, VERSION};

use crate::session::SessionOutcome;

/// Process exit code for a finished session.
pub fn exit_code(outcome: &SessionOutcome) -> i32 {
    match outcome {
        SessionOutcome::Completed(_) => 0,
        SessionOutcome::Failed(_) => 1,
        SessionOutcome::Cancelled => 130,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StreamError;
    use crate::sse::JobResult;

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(&SessionOutcome::Completed(JobResult::stream_ended())), 0);
        assert_eq!(exit_code(&SessionOutcome::Failed(StreamError::NoBody)), 1);
        assert_eq!(exit_code(&SessionOutcome::Cancelled), 130);
    }
}
