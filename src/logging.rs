//! Diagnostic logging for the command-line tools
//!
//! Status lines go to stdout with `println!`; `tracing` output goes to stderr
//! so the two never mix.

use tracing_subscriber::EnvFilter;

/// Environment variable overriding the filter, e.g. `TMF_LOG=tmf_log=trace`
pub const LOG_ENV_VAR: &str = "TMF_LOG";

/// Default filter directives for the library and the calling binary
pub fn default_filter(binary: &str, debug: bool) -> String {
    let level = if debug { "debug" } else { "warn" };
    format!("tmf_log={level},{binary}={level}")
}

/// Install the stderr subscriber. Safe to call more than once.
pub fn init_logging(binary: &str, debug: bool) {
    let filter = std::env::var(LOG_ENV_VAR).unwrap_or_else(|_| default_filter(binary, debug));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(debug)
        .with_env_filter(EnvFilter::new(filter))
        .try_init();
}
