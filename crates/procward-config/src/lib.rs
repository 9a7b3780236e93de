//! Configuration for procward hosts
//!
//! Precedence: CLI > config file > built-in defaults. The config file is
//! `.procward/config.toml`, discovered by searching upward from the working
//! directory, or given explicitly.

pub mod config;
pub mod error;

pub use config::{
    CliArgs, Config, ConfigBuilder, ConfigSource, DEFAULT_TIMEOUT_MS, LogFormat, LoggingSettings,
    RunnerSettings,
};
pub use error::ConfigError;
