//! Configuration management for NNRT
//!
//! This crate provides the typed runtime configuration and the sources it is
//! assembled from: built-in defaults, an optional TOML or JSON file, and
//! `NNRT_*` environment overrides, applied in that order.

pub mod schema;
pub mod sources;
pub mod validation;

// Re-export commonly used types
pub use schema::{DispatchPolicy, EngineConfig, LogConfig, LogFormat, RuntimeConfig};
pub use sources::{ConfigSource, EnvSource, FileSource};
pub use validation::ConfigValidator;

use std::path::Path;

use common::Result;
use tracing::debug;

/// Loads a configuration from defaults, an optional file and the process environment
pub fn load(path: Option<&Path>) -> Result<RuntimeConfig> {
    let mut config = RuntimeConfig::default();

    if let Some(path) = path {
        FileSource::new(path).apply(&mut config)?;
    }
    EnvSource::from_process().apply(&mut config)?;

    ConfigValidator::validate(&config)?;
    debug!("Loaded runtime configuration: {:?}", config);

    Ok(config)
}
