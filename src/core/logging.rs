//! Tracing subscriber setup for the binary
//!
//! The library only emits events; installing a subscriber is left to the
//! executable. Filtering follows `RUST_LOG`, defaulting to [`DEFAULT_FILTER`].

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "strategik=info";

/// Build the filter from `RUST_LOG`, or `fallback` when unset or invalid
pub fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Install the fmt subscriber; a second call is a no-op
pub fn init_tracing(verbose: bool) {
    let fallback = if verbose {
        "strategik=debug"
    } else {
        DEFAULT_FILTER
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(fallback))
        .with_target(false)
        .try_init();
}
