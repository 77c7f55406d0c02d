//! Diagnostic logging for the CLI.
//!
//! Library crates only emit `tracing` events; this installs the subscriber
//! that prints them to stderr.

use std::io;

use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding a full filter directive, e.g.
/// `STRATA_LOG=strata_resource=debug`.
pub const LOG_ENV: &str = "STRATA_LOG";

/// Returns the default level for the given verbosity flags.
pub fn default_level(quiet: bool, verbose: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Installs the stderr subscriber. `STRATA_LOG` takes precedence over the
/// verbosity flags. Calling this more than once keeps the first subscriber.
pub fn init(quiet: bool, verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_level(quiet, verbose)));
    let layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(io::stderr)
        .with_target(verbose);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}
