//! Subprocess supervision for host applications
//!
//! Two components:
//!
//! - [`ProcessRegistry`] tracks long-lived children by [`ProcessId`]: start,
//!   drain captured output, kill (including descendants), remove, reset.
//! - [`CommandRunner`] runs one command under a time budget and reports a
//!   [`CommandResult`], killing the process tree when the budget runs out.
//!
//! Everything is synchronous; no async runtime is required.
//!
//! # Failure Model
//!
//! Callers must keep three outcomes apart:
//!
//! - the program could not be executed: [`RunnerError::LaunchFailure`]
//! - it ran past its budget: `CommandResult::finished() == false`
//! - it ran to completion: `CommandResult::finished() == true`

pub mod args;
pub mod error;
pub mod launch_spec;
pub mod platform;
pub mod registry;
pub mod result;
pub mod runner;
pub mod spawner;
mod tracked;
pub mod types;

pub use error::RunnerError;
pub use launch_spec::LaunchSpec;
pub use registry::ProcessRegistry;
pub use result::{CommandResult, CommandResultParts};
pub use runner::{CommandRunner, DEFAULT_TIMEOUT, run_command};
pub use spawner::{OsSpawner, SpawnedChild, Spawner};
pub use types::{ProcessId, ProcessInfo};
