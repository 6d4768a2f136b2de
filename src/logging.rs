//! Tracing subscriber setup for the binary and benchmarks.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
///
/// Returns `false` if a subscriber was already installed.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let builder = fmt().with_env_filter(filter).with_target(false);
    let result = if config.json {
        builder.json().with_current_span(true).try_init()
    } else {
        builder.try_init()
    };
    result.is_ok()
}
