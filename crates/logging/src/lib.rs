//! Logging for NNRT
//!
//! This crate installs the global `tracing` subscriber from the logging
//! section of the runtime configuration. `RUST_LOG` takes precedence over
//! the configured level so a deployed binary can be inspected without
//! editing its configuration file.

use common::error::{Error, Result};
use runtime_config::{LogConfig, LogFormat};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Builds the filter for `config`, preferring `RUST_LOG` when it is set
pub fn build_filter(config: &LogConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| Error::Config(format!("Invalid log filter '{}': {}", config.level, e))),
    }
}

/// Installs the global subscriber
///
/// Calling this more than once is harmless: when a global subscriber is
/// already set the existing one is kept.
pub fn init(config: &LogConfig) -> Result<()> {
    let filter = build_filter(config)?;

    let installed = match config.format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(config.with_target)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(config.with_target)
            .try_init(),
    };

    if installed.is_err() {
        debug!("Global subscriber already installed; keeping it");
    }

    Ok(())
}
