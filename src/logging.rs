//! Log output setup
//!
//! Logs go to stderr so the rendered segment on stdout stays clean. `RUST_LOG`
//! overrides the default filter.

use std::io;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directive for the given verbosity
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "skyprompt=debug,warn"
    } else {
        "skyprompt=warn"
    }
}

/// Installs the global tracing subscriber
///
/// Does nothing if a subscriber is already installed.
pub fn init(verbose: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbose).into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(false)
                .with_target(false),
        )
        .try_init();
}

/// Log capture for asserting on emitted events in tests
#[cfg(test)]
pub(crate) use capture::capture_logs;


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_quiet() {
        assert_eq!(default_filter(false), "skyprompt=warn");
    }

    #[test]
    fn test_default_filter_verbose() {
        assert!(default_filter(true).contains("skyprompt=debug"));
    }

    #[test]
    fn test_capture_logs_records_debug_events() {
        let (_guard, logs) = capture_logs();

        tracing::debug!(answer = 42, "captured event");

        let output = logs.contents();
        assert!(output.contains("captured event"), "Unexpected output: {}", output);
        assert!(output.contains("answer=42"));
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init(false);
        init(true);
    }
}
