//! Error types for the runner crate

use thiserror::Error;

use crate::types::ProcessId;

/// Errors raised by the process registry and the bounded command runner.
///
/// A command that was launched but overran its time budget is *not* an error;
/// it is reported as `finished == false` in a [`CommandResult`](crate::CommandResult).
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error("No tracked process with id {id}")]
    NotFound { id: ProcessId },

    #[error("Unable to launch `{program}`: {reason}")]
    LaunchFailure { program: String, reason: String },

    #[error("Failed to {operation} process {pid}: {reason}")]
    ProcessControl {
        pid: u32,
        operation: &'static str,
        reason: String,
    },
}

impl RunnerError {
    pub(crate) fn missing(name: &'static str) -> Self {
        Self::InvalidArgument {
            name,
            reason: "value is required".to_string(),
        }
    }

    pub(crate) fn control(pid: u32, operation: &'static str, err: impl std::fmt::Display) -> Self {
        Self::ProcessControl {
            pid,
            operation,
            reason: err.to_string(),
        }
    }

    /// Whether this error means the program could not even be attempted.
    #[must_use]
    pub const fn is_launch_failure(&self) -> bool {
        matches!(self, Self::LaunchFailure { .. })
    }

    /// Whether this error refers to an identifier absent from the registry.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_the_id() {
        let id = ProcessId::new();
        let err = RunnerError::NotFound { id };
        assert!(err.to_string().contains(&id.to_string()));
        assert!(err.is_not_found());
        assert!(!err.is_launch_failure());
    }

    #[test]
    fn test_launch_failure_message() {
        let err = RunnerError::LaunchFailure {
            program: "nope".to_string(),
            reason: "No such file or directory".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unable to launch `nope`: No such file or directory"
        );
        assert!(err.is_launch_failure());
    }

    #[test]
    fn test_missing_is_invalid_argument() {
        match RunnerError::missing("output") {
            RunnerError::InvalidArgument { name, .. } => assert_eq!(name, "output"),
            other => panic!("Expected InvalidArgument, got {other:?}"),
        }
    }
}
