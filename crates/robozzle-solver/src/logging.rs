//! Diagnostic tracing for the command-line solver.
//!
//! The JSON report goes to stdout; everything logged here goes to stderr and
//! is controlled by `RUST_LOG`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber.
///
/// Reads `RUST_LOG`, defaulting to `warn` so only oversized search spaces
/// are reported.
///
/// # Example
/// ```bash
/// RUST_LOG=robozzle_solver=debug robozzle-solver solve board.txt --start 0,0 --direction right --functions 5
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
