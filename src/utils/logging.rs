//! Structured logging setup.
//!
//! The analyzer itself only emits `tracing` events; embedding applications
//! decide where they go. [`init_logging`] is the convenience path for
//! binaries and test harnesses that just want console output driven by
//! [`LoggingConfig`].

use crate::config::LoggingConfig;
use crate::error::{AnalyzerError, Result};
use tracing_subscriber::EnvFilter;

/// Install a global `tracing` subscriber configured from `config`.
///
/// `RUST_LOG` takes precedence over `config.log_level` when set.
///
/// # Errors
/// Returns `ConfigError` if a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str().to_lowercase()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.show_target);

    let installed = if config.json_format {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| AnalyzerError::ConfigError(format!("Failed to install logger: {e}")))?;

    tracing::info!(app = %config.app_name, "Logging initialized");
    Ok(())
}
