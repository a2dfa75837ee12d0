//! Tracing initialization: a `tracing_subscriber::fmt` subscriber extended
//! with an `EnvFilter` so `RUST_LOG` controls verbosity.

use tracing_subscriber::EnvFilter;

/// Install a global `tracing` subscriber that writes formatted spans/events
/// to stdout, honoring `RUST_LOG` (defaulting to `info` when unset).
///
/// Panics if a global subscriber is already installed; call this once, at
/// process start.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
