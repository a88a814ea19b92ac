//! Operator-facing tracing setup.
//!
//! Progress and diagnostics go through `tracing` to stderr; the run
//! summary and verification listing are product output on stdout and are
//! unaffected by the log filter.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the global tracing subscriber.
///
/// Reads `RUST_LOG`; defaults to `info` when unset. Call once, from the
/// binary entry point.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
