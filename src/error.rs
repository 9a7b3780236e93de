use std::io;
use thiserror::Error;

use procward_config::ConfigError;
use procward_runner::RunnerError;

use crate::exit_codes::ExitCode;

/// Error type of the procward host.
///
/// | Exit Code | Error |
/// |-----------|-------|
/// | 2 | Configuration errors, invalid runner arguments |
/// | 4 | Unknown process identifier |
/// | 127 | Program could not be executed |
/// | 1 | Everything else |
///
/// Library code returns `ProcwardError` and never calls `std::process::exit()`;
/// [`cli::run`](crate::cli::run) prints [`display_for_user`](Self::display_for_user)
/// and hands the exit code to `main`.
#[derive(Error, Debug)]
pub enum ProcwardError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Runner error: {0}")]
    Runner(#[from] RunnerError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProcwardError {
    /// Primary message shown to the user
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(err) => err.to_string(),
            Self::Runner(RunnerError::LaunchFailure { program, reason }) => {
                format!("Could not execute '{program}': {reason}")
            }
            Self::Runner(err) => err.to_string(),
            Self::Io(err) => format!("I/O failure: {err}"),
            Self::Json(err) => format!("Failed to encode result as JSON: {err}"),
        }
    }

    #[must_use]
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(err) => err
                .suggestion()
                .map(|s| vec![s.to_string()])
                .unwrap_or_default(),
            Self::Runner(RunnerError::LaunchFailure { .. }) => vec![
                "Check that the program exists and is on PATH".to_string(),
                "Check that the file is executable".to_string(),
            ],
            Self::Runner(RunnerError::InvalidArgument { .. }) => {
                vec!["Run `procward --help` for usage".to_string()]
            }
            Self::Runner(RunnerError::ProcessControl { .. }) => {
                vec!["Run with --verbose for more detail".to_string()]
            }
            Self::Runner(RunnerError::NotFound { .. }) | Self::Io(_) | Self::Json(_) => Vec::new(),
        }
    }

    /// Message plus suggestions, formatted for stderr
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut output = format!("Error: {}\n", self.user_message());
        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }
        output
    }

    /// Map this error to the process exit code.
    #[must_use]
    pub fn to_exit_code(&self) -> ExitCode {
        match self {
            Self::Config(_) => ExitCode::CLI_ARGS,
            Self::Runner(RunnerError::InvalidArgument { .. }) => ExitCode::CLI_ARGS,
            Self::Runner(RunnerError::NotFound { .. }) => ExitCode::NOT_FOUND,
            Self::Runner(RunnerError::LaunchFailure { .. }) => ExitCode::LAUNCH_FAILURE,
            Self::Runner(RunnerError::ProcessControl { .. }) | Self::Io(_) | Self::Json(_) => {
                ExitCode::INTERNAL
            }
        }
    }
}
