use thiserror::Error;

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration file: {0}")]
    InvalidFile(String),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found at {path}")]
    NotFound { path: String },

    #[error("Configuration discovery failed: {reason}")]
    DiscoveryFailed { reason: String },
}

impl ConfigError {
    pub(crate) fn invalid_value(key: &str, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            value: value.into(),
        }
    }

    /// Actionable hint for the user, if one applies.
    #[must_use]
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::InvalidFile(_) => Some("Check the TOML syntax of .procward/config.toml"),
            Self::InvalidValue { .. } => {
                Some("Valid keys: [runner] default_timeout_ms, raise_priority; [logging] verbose, format")
            }
            Self::NotFound { .. } => Some("Pass an existing file to --config or omit the flag"),
            Self::DiscoveryFailed { .. } => None,
        }
    }
}
