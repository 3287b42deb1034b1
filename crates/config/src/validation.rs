//! Configuration validation

use common::error::{Error, Result};

use crate::schema::RuntimeConfig;

/// Checks a fully assembled configuration
pub struct ConfigValidator;

impl ConfigValidator {
    /// Levels accepted as the bare default directive
    const LEVELS: [&'static str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

    /// Validates `config`, returning the first problem found
    pub fn validate(config: &RuntimeConfig) -> Result<()> {
        let level = config.log.level.to_lowercase();
        // Directives such as "inference_engine=trace" are left to EnvFilter.
        if !level.contains('=') && !Self::LEVELS.contains(&level.as_str()) {
            return Err(Error::Config(format!("Unknown log level: {}", config.log.level)));
        }

        if config.engine.default_fixed_point_position >= 16 {
            return Err(Error::Config(format!(
                "Fixed-point position {} does not fit a 16-bit tensor",
                config.engine.default_fixed_point_position
            )));
        }

        Ok(())
    }
}
