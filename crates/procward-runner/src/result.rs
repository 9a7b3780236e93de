//! Outcome of one bounded command execution

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::RunnerError;

/// Immutable record of one [`CommandRunner`](crate::CommandRunner) invocation.
///
/// Serialized field names are part of the reporting contract:
/// `command`, `started`, `finished`, `output`, `error`, `runtime` (milliseconds).
///
/// | `started` | `finished` | Meaning |
/// |-----------|------------|---------|
/// | `false` | `false` | The launcher declined to start the process |
/// | `true` | `false` | Ran past its time budget and was killed |
/// | `true` | `true` | Exited on its own within the budget |
///
/// A program that could not be executed at all never produces a
/// `CommandResult`; the runner returns [`RunnerError::LaunchFailure`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CommandResultParts")]
pub struct CommandResult {
    command: String,
    started: bool,
    finished: bool,
    output: String,
    error: String,
    runtime: u32,
}

/// Unvalidated fields of a [`CommandResult`].
///
/// Converting with `CommandResult::try_from` is the checked construction path;
/// deserialization goes through it as well.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommandResultParts {
    pub command: Option<String>,
    pub started: bool,
    pub finished: bool,
    pub output: Option<String>,
    pub error: Option<String>,
    pub runtime: u32,
}

impl CommandResult {
    /// Result of a process that was started.
    #[must_use]
    pub fn new(
        command: impl Into<String>,
        finished: bool,
        output: impl Into<String>,
        error: impl Into<String>,
        runtime: u32,
    ) -> Self {
        Self {
            command: command.into(),
            started: true,
            finished,
            output: output.into(),
            error: error.into(),
            runtime,
        }
    }

    /// Result of a launch the launcher declined without raising an error.
    #[must_use]
    pub fn not_started(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            started: false,
            finished: false,
            output: String::new(),
            error: String::new(),
            runtime: 0,
        }
    }

    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    #[must_use]
    pub const fn started(&self) -> bool {
        self.started
    }

    #[must_use]
    pub const fn finished(&self) -> bool {
        self.finished
    }

    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    #[must_use]
    pub fn error(&self) -> &str {
        &self.error
    }

    /// Elapsed wall-clock time in milliseconds.
    #[must_use]
    pub const fn runtime(&self) -> u32 {
        self.runtime
    }

    #[must_use]
    pub fn runtime_duration(&self) -> Duration {
        Duration::from_millis(u64::from(self.runtime))
    }

    /// Started but killed at the deadline.
    #[must_use]
    pub const fn timed_out(&self) -> bool {
        self.started && !self.finished
    }
}

impl TryFrom<CommandResultParts> for CommandResult {
    type Error = RunnerError;

    fn try_from(parts: CommandResultParts) -> Result<Self, Self::Error> {
        let command = parts.command.ok_or_else(|| RunnerError::missing("command"))?;
        let output = parts.output.ok_or_else(|| RunnerError::missing("output"))?;
        let error = parts.error.ok_or_else(|| RunnerError::missing("error"))?;

        if !parts.started {
            if parts.finished {
                return Err(RunnerError::InvalidArgument {
                    name: "finished",
                    reason: "a process that never started cannot have finished".to_string(),
                });
            }
            if !output.is_empty() || !error.is_empty() || parts.runtime != 0 {
                return Err(RunnerError::InvalidArgument {
                    name: "started",
                    reason: "a process that never started has no output and no runtime"
                        .to_string(),
                });
            }
        }

        Ok(Self {
            command,
            started: parts.started,
            finished: parts.finished,
            output,
            error,
            runtime: parts.runtime,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn parts() -> CommandResultParts {
        CommandResultParts {
            command: Some("echo hi".to_string()),
            started: true,
            finished: true,
            output: Some("hi\n".to_string()),
            error: Some(String::new()),
            runtime: 3,
        }
    }

    #[test]
    fn test_serialized_field_names() {
        let result = CommandResult::new("echo Hello World!", true, "Hello World!\n", "", 4);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "command": "echo Hello World!",
                "started": true,
                "finished": true,
                "output": "Hello World!\n",
                "error": "",
                "runtime": 4
            })
        );
    }

    #[test]
    fn test_not_started_shape() {
        let result = CommandResult::not_started("ls ");
        assert!(!result.started());
        assert!(!result.finished());
        assert!(result.output().is_empty());
        assert!(result.error().is_empty());
        assert_eq!(result.runtime(), 0);
        assert!(!result.timed_out());
    }

    #[test]
    fn test_missing_text_fields_are_invalid_argument() {
        for field in ["command", "output", "error"] {
            let mut p = parts();
            match field {
                "command" => p.command = None,
                "output" => p.output = None,
                _ => p.error = None,
            }
            match CommandResult::try_from(p) {
                Err(RunnerError::InvalidArgument { name, .. }) => assert_eq!(name, field),
                other => panic!("Expected InvalidArgument for {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_null_in_json_is_rejected() {
        let json = r#"{"command":"ls ","started":true,"finished":true,"output":null,"error":"","runtime":1}"#;
        let err = serde_json::from_str::<CommandResult>(json).unwrap_err();
        assert!(err.to_string().contains("output"), "unexpected error: {err}");
    }

    #[test]
    fn test_not_started_cannot_be_finished() {
        let mut p = parts();
        p.started = false;
        p.output = Some(String::new());
        p.runtime = 0;
        assert!(matches!(
            CommandResult::try_from(p),
            Err(RunnerError::InvalidArgument { name: "finished", .. })
        ));
    }

    #[test]
    fn test_json_deserializes_through_validation() {
        let json = r#"{"command":"ping 127.0.0.1","started":true,"finished":false,"output":"PING","error":"","runtime":5}"#;
        let result: CommandResult = serde_json::from_str(json).unwrap();
        assert!(result.timed_out());
        assert_eq!(result.runtime_duration(), Duration::from_millis(5));
    }

    proptest! {
        #[test]
        fn prop_validated_results_respect_not_started_invariant(
            started in any::<bool>(),
            finished in any::<bool>(),
            output in ".{0,8}",
            error in ".{0,8}",
            runtime in any::<u32>(),
        ) {
            let parts = CommandResultParts {
                command: Some("cmd ".to_string()),
                started,
                finished,
                output: Some(output),
                error: Some(error),
                runtime,
            };
            if let Ok(result) = CommandResult::try_from(parts) {
                if !result.started() {
                    prop_assert!(!result.finished());
                    prop_assert!(result.output().is_empty());
                    prop_assert!(result.error().is_empty());
                    prop_assert_eq!(result.runtime(), 0);
                }
            }
        }
    }
}
