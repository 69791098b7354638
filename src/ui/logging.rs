//! ui::logging
//!
//! Subscriber setup for `tracing`.
//!
//! Events go to stderr so stdout stays reserved for the report. The level
//! follows the verbosity flags unless `OCFL_AUDIT_LOG` holds an `EnvFilter`
//! directive, which always wins. With `--json`, events are emitted as one
//! JSON object per line.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use super::output::Verbosity;

/// Environment variable overriding the log filter.
pub const LOG_ENV: &str = "OCFL_AUDIT_LOG";

/// Default filter directive for a verbosity level.
pub fn default_directive(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Quiet => "off",
        Verbosity::Normal => "ocfl_audit=warn",
        Verbosity::Debug => "ocfl_audit=debug",
    }
}

/// Install the global subscriber.
///
/// Installing twice is not an error; the first subscriber stays.
pub fn init(verbosity: Verbosity, json: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let subscriber = tracing_subscriber::registry().with(filter);

    let result = if json {
        subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init()
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(verbosity == Verbosity::Debug),
            )
            .try_init()
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "subscriber already installed");
    }
}
