//! Logging bootstrap for the binary.
//!
//! The library only emits `tracing` events; installing a subscriber is the
//! binary's job.
//!
//! Environment variables:
//! - `JOBSTREAM_LOG`: filter directive (`debug`, `jobstream=trace`, ...)
//! - `RUST_LOG`: fallback filter
//!
//! Output goes to stderr so stdout only carries progress lines.

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

pub const ENV_LOG: &str = "JOBSTREAM_LOG";

const DEFAULT_FILTER: &str = "warn";

static INIT: OnceCell<()> = OnceCell::new();

fn resolve_env_filter() -> EnvFilter {
    if let Ok(level) = std::env::var(ENV_LOG) {
        if let Ok(filter) = EnvFilter::try_new(level) {
            return filter;
        }
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber once per process.
pub fn init_logging() {
    INIT.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(resolve_env_filter())
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_invalid_filter_falls_back() {
        std::env::set_var(ENV_LOG, "not a [valid filter");
        let filter = resolve_env_filter();
        std::env::remove_var(ENV_LOG);
        assert!(!filter.to_string().is_empty());
    }

    #[test]
    #[serial]
    fn test_init_is_idempotent() {
        init_logging();
        init_logging();
    }
}
