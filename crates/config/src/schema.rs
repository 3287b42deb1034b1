//! Configuration schema
//!
//! Typed sections of the runtime configuration. Every field has a default so
//! partial files deserialize cleanly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Top-level runtime configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Logging section
    pub log: LogConfig,
    /// Execution engine section
    pub engine: EngineConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    /// Output format
    pub format: LogFormat,
    /// Whether to print the event target
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            with_target: true,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable lines
    Pretty,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Execution engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How functions choose between the float and the codec path
    pub dispatch: DispatchPolicy,
    /// Fixed-point position used when a fixed-point tensor is created without one
    pub default_fixed_point_position: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dispatch: DispatchPolicy::PerExecute,
            default_fixed_point_position: 7,
        }
    }
}

/// Fast-path selection policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DispatchPolicy {
    /// Test tensor representations on every execute
    PerExecute,
    /// Test once at allocate and keep the decision in the context
    CachedAtAllocate,
    /// Always take the codec path
    GenericOnly,
}

impl fmt::Display for DispatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchPolicy::PerExecute => write!(f, "per-execute"),
            DispatchPolicy::CachedAtAllocate => write!(f, "cached-at-allocate"),
            DispatchPolicy::GenericOnly => write!(f, "generic-only"),
        }
    }
}

impl FromStr for DispatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "per-execute" => Ok(DispatchPolicy::PerExecute),
            "cached" | "cached-at-allocate" => Ok(DispatchPolicy::CachedAtAllocate),
            "generic" | "generic-only" => Ok(DispatchPolicy::GenericOnly),
            _ => Err(format!("Unknown dispatch policy: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.log.level, "info");
        assert_eq!(config.log.format, LogFormat::Pretty);
        assert_eq!(config.engine.dispatch, DispatchPolicy::PerExecute);
        assert_eq!(config.engine.default_fixed_point_position, 7);
    }

    #[test]
    fn test_dispatch_policy_parse() {
        assert_eq!("cached".parse::<DispatchPolicy>(), Ok(DispatchPolicy::CachedAtAllocate));
        assert_eq!("generic_only".parse::<DispatchPolicy>(), Ok(DispatchPolicy::GenericOnly));
        assert_eq!("Per-Execute".parse::<DispatchPolicy>(), Ok(DispatchPolicy::PerExecute));
        assert!("fastest".parse::<DispatchPolicy>().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: RuntimeConfig = toml::from_str("[engine]\ndispatch = \"generic-only\"\n").unwrap();
        assert_eq!(config.engine.dispatch, DispatchPolicy::GenericOnly);
        assert_eq!(config.engine.default_fixed_point_position, 7);
        assert_eq!(config.log, LogConfig::default());
    }
}
