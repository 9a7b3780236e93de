//! Configuration model and loading
//!
//! - `model`: settings types and source attribution
//! - `discovery`: config file discovery and layering
//! - `builder`: programmatic construction
//! - `validation`: value checks shared by every construction path
//! - `sources`: effective configuration report

mod builder;
mod discovery;
mod model;
mod sources;
mod validation;

pub use builder::ConfigBuilder;
pub use model::{
    CliArgs, Config, ConfigSource, DEFAULT_TIMEOUT_MS, LogFormat, LoggingSettings, RunnerSettings,
};
