//! Application logging functionality
//!
//! Installs the tracing subscriber for the command line binary. Library
//! code only emits events; it never initializes logging itself.

use tracing_subscriber::EnvFilter;

/// Initialize stderr logging. The `RUST_LOG` environment variable
/// overrides the default `info` filter.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
