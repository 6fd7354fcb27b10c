//! Logging infrastructure for Biblio.
//!
//! Log lines go to stderr so they never interleave with menu output or
//! with command results a caller may be piping.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the stderr subscriber for the `biblio` binary
///
/// Only warnings (such as catalog inconsistencies found at load) are shown
/// by default; `verbose` lowers the threshold to debug. A `RUST_LOG` value
/// in the environment wins over both.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

fn default_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Initialize logging for testing (captures logs for test output)
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
