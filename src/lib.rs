//! procward: subprocess supervision for host applications
//!
//! The core lives in [`procward_runner`] (process registry, bounded command
//! runner) and [`procward_config`] (layered configuration). This crate adds
//! the `procward` binary on top: CLI, logging, error reporting, exit codes.
//!
//! # Example
//!
//! ```rust,no_run
//! use procward::{CommandRunner, DEFAULT_TIMEOUT};
//!
//! let result = CommandRunner::new().run("echo", "Hello World!", DEFAULT_TIMEOUT)?;
//! assert!(result.finished());
//! # Ok::<(), procward::RunnerError>(())
//! ```

pub mod cli;
pub mod error;
pub mod exit_codes;
pub mod logging;

pub use error::ProcwardError;
pub use exit_codes::ExitCode;

pub use procward_config::{CliArgs, Config, ConfigBuilder, ConfigError, ConfigSource, LogFormat};
pub use procward_runner::{
    CommandResult, CommandRunner, DEFAULT_TIMEOUT, LaunchSpec, ProcessId, ProcessInfo,
    ProcessRegistry, RunnerError, run_command,
};
