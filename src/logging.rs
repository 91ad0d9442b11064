//! Logging initialization.
//!
//! Configures the `tracing` subscriber with level filtering via the
//! `TABSTORE_LOG` environment variable. Falls back to the configured level
//! when the variable is unset or invalid.
//!
//! # Usage
//!
//! ```bash
//! # Configured level (warn by default)
//! tabstore replay script.jsonl
//!
//! # Module-specific filtering
//! TABSTORE_LOG=tabstore::store=debug,warn tabstore replay script.jsonl
//! ```

use crate::config::LogLevel;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding filter directives.
pub const LOG_ENV_VAR: &str = "TABSTORE_LOG";

/// Builds the filter: `TABSTORE_LOG` when set and valid, `level` otherwise.
pub fn filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}

/// Initialize the tracing subscriber.
///
/// Output is written to stderr so stdout stays free for command output.
/// A second call is a no-op.
pub fn init(level: LogLevel) {
    let installed = fmt()
        .with_env_filter(filter(level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
