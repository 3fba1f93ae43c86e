//! Logging setup for ragsift
//!
//! Installs a `tracing` subscriber. `RAGSIFT_LOG` overrides the configured
//! level with a full `EnvFilter` directive.

use tracing_subscriber::EnvFilter;

/// Environment variable consulted before the configured level
pub const LOG_ENV: &str = "RAGSIFT_LOG";

/// Filter from `RAGSIFT_LOG`, falling back to `level`
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level))
}

/// Initialize the global subscriber. Later calls are no-ops.
pub fn init_logging(level: &str, json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(build_filter(level))
        .with_target(true)
        .with_writer(std::io::stderr);

    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
