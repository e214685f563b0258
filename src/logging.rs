//! Diagnostic logging via `tracing`.
//!
//! The library only emits events; the binary installs a subscriber that
//! writes to stderr so it never mixes with command output.  The filter
//! comes from `PASSORDR_LOG` (same syntax as `RUST_LOG`), falling back
//! to `passordr=warn`, or `passordr=debug` with `--verbose`.

use tracing_subscriber::EnvFilter;

/// Environment variable read for the log filter.
pub const LOG_ENV: &str = "PASSORDR_LOG";

/// Build the filter used by `init`.
pub fn filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "warn" };
        EnvFilter::new(format!("passordr={level}"))
    })
}

/// Install the stderr subscriber.  Calling it twice is harmless.
pub fn init(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
