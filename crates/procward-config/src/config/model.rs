use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Runner time budget when neither the CLI nor a config file sets one.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Output style of the tracing subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl LogFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::invalid_value(
                "logging.format",
                format!("'{other}' is not one of: compact, json"),
            )),
        }
    }
}

/// Where an effective setting came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Cli,
    ConfigFile(PathBuf),
    Programmatic,
    Default,
}

impl ConfigSource {
    /// Stable short label used in `procward config` output.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Cli => "cli",
            Self::ConfigFile(_) => "config",
            Self::Programmatic => "programmatic",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigFile(path) => write!(f, "config file ({})", path.display()),
            other => f.write_str(other.label()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerSettings {
    pub default_timeout_ms: u64,
    pub raise_priority: bool,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
            raise_priority: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub verbose: bool,
    pub format: LogFormat,
}

/// Values supplied on the command line; `None` defers to the file or defaults.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub timeout_ms: Option<u64>,
    pub raise_priority: Option<bool>,
    pub verbose: Option<bool>,
    pub log_format: Option<String>,
}

/// Effective host configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub runner: RunnerSettings,
    pub logging: LoggingSettings,
    /// Setting key (`runner.default_timeout_ms`, ...) to the layer that supplied it
    pub source_attribution: HashMap<String, ConfigSource>,
    /// Config file that was loaded, if any
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let source_attribution = Self::SETTING_KEYS
            .iter()
            .map(|key| ((*key).to_string(), ConfigSource::Default))
            .collect();
        Self {
            runner: RunnerSettings::default(),
            logging: LoggingSettings::default(),
            source_attribution,
            config_path: None,
        }
    }
}

impl Config {
    pub(crate) const SETTING_KEYS: [&'static str; 4] = [
        "runner.default_timeout_ms",
        "runner.raise_priority",
        "logging.verbose",
        "logging.format",
    ];

    /// Runner budget as a [`Duration`].
    #[must_use]
    pub const fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.runner.default_timeout_ms)
    }

    #[must_use]
    pub fn source_of(&self, key: &str) -> Option<&ConfigSource> {
        self.source_attribution.get(key)
    }

    pub(crate) fn set_source(&mut self, key: &str, source: ConfigSource) {
        self.source_attribution.insert(key.to_string(), source);
    }
}

/// On-disk shape of `.procward/config.toml`
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TomlConfig {
    pub runner: Option<TomlRunner>,
    pub logging: Option<TomlLogging>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TomlRunner {
    pub default_timeout_ms: Option<u64>,
    pub raise_priority: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TomlLogging {
    pub verbose: Option<bool>,
    pub format: Option<String>,
}
