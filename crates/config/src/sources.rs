//! Configuration sources
//!
//! A source mutates a [`RuntimeConfig`] in place; sources are applied one
//! after the other so later sources override earlier ones.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use common::error::{Error, Result};
use common::utils::parse_bool;
use tracing::debug;

use crate::schema::RuntimeConfig;

/// Something that contributes configuration values
pub trait ConfigSource {
    /// Applies this source on top of `config`
    fn apply(&self, config: &mut RuntimeConfig) -> Result<()>;
}

/// Configuration file (`.toml` or `.json`)
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Creates a file source
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ConfigSource for FileSource {
    fn apply(&self, config: &mut RuntimeConfig) -> Result<()> {
        debug!("Reading configuration file {}", self.path.display());
        let text = std::fs::read_to_string(&self.path)?;

        let extension = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();

        *config = match extension.as_str() {
            "toml" => toml::from_str(&text).map_err(|e| {
                Error::Config(format!("{}: {}", self.path.display(), e))
            })?,
            "json" => serde_json::from_str(&text)?,
            other => {
                return Err(Error::Config(format!(
                    "Unsupported configuration file extension '{}'",
                    other
                )))
            }
        };

        Ok(())
    }
}

/// `NNRT_*` environment variables
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    vars: HashMap<String, String>,
}

impl EnvSource {
    /// Prefix shared by every recognized variable
    pub const PREFIX: &'static str = "NNRT_";

    /// Snapshot of the process environment
    pub fn from_process() -> Self {
        Self::from_pairs(std::env::vars())
    }

    /// Source built from explicit key/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _)| k.starts_with(Self::PREFIX))
            .collect();
        Self { vars }
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(&format!("{}{}", Self::PREFIX, key))
            .map(String::as_str)
    }
}

impl ConfigSource for EnvSource {
    fn apply(&self, config: &mut RuntimeConfig) -> Result<()> {
        if let Some(level) = self.get("LOG_LEVEL") {
            config.log.level = level.to_string();
        }
        if let Some(format) = self.get("LOG_FORMAT") {
            config.log.format = format.parse().map_err(Error::Config)?;
        }
        if let Some(with_target) = self.get("LOG_WITH_TARGET") {
            config.log.with_target = parse_bool(with_target);
        }
        if let Some(dispatch) = self.get("DISPATCH") {
            config.engine.dispatch = dispatch.parse().map_err(Error::Config)?;
        }
        if let Some(position) = self.get("FIXED_POINT_POSITION") {
            config.engine.default_fixed_point_position = position.parse().map_err(|_| {
                Error::Config(format!("Invalid NNRT_FIXED_POINT_POSITION: {}", position))
            })?;
        }
        Ok(())
    }
}
