//! Logging configuration for sqlapi.
//!
//! Logs go to stdout so the service plays well with container log
//! collection. The level defaults to `info`, which includes one profile line
//! per executed statement, and follows `RUST_LOG` when set.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info";

/// Initializes logging to stdout.
pub fn init_stdout_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stdout)
        .init();
}

/// Builds the filter from `RUST_LOG`, falling back to the default level.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
