//! Structured logging using **tracing**.
//!
//! All diagnostics go to stderr so stdout stays reserved for the report.
//! The JSON subscriber provides machine-readable output for CI pipelines.

use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber.
///
/// This should be called *once* at the beginning of the application's runtime.
///
/// # Environment Variables
/// - `RUST_LOG`: Overrides the level filter (e.g., `RUST_LOG=deadcss_core=trace`)
pub fn init_logging(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_level(true)
        .with_target(verbose)
        .with_writer(std::io::stderr);

    // try_init: a second call (e.g. from tests) is a no-op rather than a panic
    if json {
        let _ = builder
            .json()
            .with_ansi(false)
            .with_current_span(true)
            .try_init();
    } else {
        let _ = builder.try_init();
    }
}
