use crate::error::ConfigError;

use super::Config;

/// Largest accepted runner budget: one day.
const MAX_TIMEOUT_MS: u64 = 24 * 60 * 60 * 1000;

impl Config {
    /// Validate configuration values
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let timeout = self.runner.default_timeout_ms;
        if timeout == 0 {
            return Err(ConfigError::invalid_value(
                "runner.default_timeout_ms",
                "must be greater than 0",
            ));
        }
        if timeout > MAX_TIMEOUT_MS {
            return Err(ConfigError::invalid_value(
                "runner.default_timeout_ms",
                format!("exceeds maximum limit of {MAX_TIMEOUT_MS} ms (24 hours)"),
            ));
        }
        Ok(())
    }
}
