//! Terminal rendering of session notifications.

use std::io::Write;

use crate::error::StreamError;
use crate::session::ProgressHandler;
use crate::sse::{JobResult, ProgressEvent, ResultStatus};

/// Format a progress notification as one line.
pub fn format_progress(event: &ProgressEvent) -> String {
    let stage = if event.stage.is_empty() {
        "progress"
    } else {
        event.stage.as_str()
    };
    match (event.fraction(), event.progress, event.total) {
        (Some(fraction), Some(done), Some(total)) => format!(
            "[{}] {} ({}/{}, {:.0}%)",
            stage,
            event.message,
            done,
            total,
            fraction * 100.0
        ),
        _ => format!("[{}] {}", stage, event.message),
    }
}

/// Format a terminal result as one line.
pub fn format_result(result: &JobResult) -> String {
    let mut line = match result.status {
        ResultStatus::Completed => format!("Completed: {}", result.message),
        ResultStatus::Skipped => format!("Skipped: {}", result.message),
        ResultStatus::Locked => format!("Locked: {}", result.message),
    };
    let mut details = Vec::new();
    if let Some(files) = result.files_indexed {
        details.push(format!("{} files", files));
    }
    if let Some(branch) = &result.branch {
        details.push(format!("branch {}", branch));
    }
    if let Some(commit) = &result.commit_hash {
        let short: String = commit.chars().take(12).collect();
        details.push(format!("commit {}", short));
    }
    if !details.is_empty() {
        line.push_str(&format!(" ({})", details.join(", ")));
    }
    line
}

/// Format a terminal error: the friendly message, then the raw detail.
pub fn format_error(error: &StreamError) -> String {
    if error.is_cancellation() {
        return error.user_message();
    }
    format!("Error: {}\n  {}", error.user_message(), error)
}

/// Writes progress and results to one writer and errors to another.
pub struct TerminalHandler<O: Write, E: Write> {
    out: O,
    err: E,
}

impl TerminalHandler<std::io::Stdout, std::io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdout(), std::io::stderr())
    }
}

impl<O: Write, E: Write> TerminalHandler<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self { out, err }
    }

    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }
}

impl<O: Write, E: Write> ProgressHandler for TerminalHandler<O, E> {
    fn on_progress(&mut self, event: &ProgressEvent) {
        let _ = writeln!(self.out, "{}", format_progress(event));
        let _ = self.out.flush();
    }

    fn on_result(&mut self, result: &JobResult) {
        let _ = writeln!(self.out, "{}", format_result(result));
        let _ = self.out.flush();
    }

    fn on_error(&mut self, error: &StreamError) {
        let _ = writeln!(self.err, "{}", format_error(error));
        let _ = self.err.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_progress_plain() {
        let event = ProgressEvent::new("clone", "Cloning repository");
        assert_eq!(format_progress(&event), "[clone] Cloning repository");
    }

    #[test]
    fn test_format_progress_with_counts() {
        let event = ProgressEvent::new("embed", "Embedding").with_counts(50.0, 200.0);
        assert_eq!(format_progress(&event), "[embed] Embedding (50/200, 25%)");
    }

    #[test]
    fn test_format_progress_without_stage() {
        let event = ProgressEvent::new("", "Working");
        assert_eq!(format_progress(&event), "[progress] Working");
    }

    #[test]
    fn test_format_result_details() {
        let mut result = JobResult::new(ResultStatus::Completed, "Indexed");
        result.files_indexed = Some(120);
        result.branch = Some("main".to_string());
        result.commit_hash = Some("0123456789abcdef".to_string());
        assert_eq!(
            format_result(&result),
            "Completed: Indexed (120 files, branch main, commit 0123456789ab)"
        );
        assert_eq!(
            format_result(&JobResult::new(ResultStatus::Locked, "Busy")),
            "Locked: Busy"
        );
    }

    #[test]
    fn test_terminal_handler_routes_output() {
        let mut handler = TerminalHandler::new(Vec::new(), Vec::new());
        handler.on_progress(&ProgressEvent::new("clone", "Cloning"));
        handler.on_error(&StreamError::Cancelled);

        let (out, err) = handler.into_inner();
        assert_eq!(String::from_utf8(out).unwrap(), "[clone] Cloning\n");
        assert_eq!(String::from_utf8(err).unwrap(), "Indexing was cancelled.\n");
    }

    #[test]
    fn test_format_error_uses_user_message() {
        let err = StreamError::HttpStatus {
            status: 409,
            body: "locked".to_string(),
        };
        assert_eq!(
            format_error(&err),
            "Error: Another indexing job is already running for this repository.\n  \
             Failed to start indexing: 409 locked"
        );
    }
}
