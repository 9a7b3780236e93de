use std::time::Duration;

use crate::error::ConfigError;

use super::{Config, ConfigSource, LogFormat};

impl Config {
    /// Create a builder for programmatic configuration.
    ///
    /// Builds a [`Config`] without reading files or the environment, which
    /// keeps embedding hosts deterministic.
    ///
    /// # Example
    ///
    /// ```rust
    /// use procward_config::{Config, LogFormat};
    /// use std::time::Duration;
    ///
    /// let config = Config::builder()
    ///     .default_timeout(Duration::from_secs(30))
    ///     .log_format(LogFormat::Json)
    ///     .build()
    ///     .expect("valid config");
    /// assert_eq!(config.runner.default_timeout_ms, 30_000);
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Fluent construction of a [`Config`]
///
/// Every value set here is attributed to [`ConfigSource::Programmatic`]; the
/// rest keep their defaults. [`build`](Self::build) runs the same validation
/// as file discovery.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Runner budget. Sub-millisecond precision is truncated.
    #[must_use]
    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.config.runner.default_timeout_ms =
            u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self.config
            .set_source("runner.default_timeout_ms", ConfigSource::Programmatic);
        self
    }

    #[must_use]
    pub fn raise_priority(mut self, raise: bool) -> Self {
        self.config.runner.raise_priority = raise;
        self.config
            .set_source("runner.raise_priority", ConfigSource::Programmatic);
        self
    }

    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.logging.verbose = verbose;
        self.config
            .set_source("logging.verbose", ConfigSource::Programmatic);
        self
    }

    #[must_use]
    pub fn log_format(mut self, format: LogFormat) -> Self {
        self.config.logging.format = format;
        self.config
            .set_source("logging.format", ConfigSource::Programmatic);
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<Config, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
