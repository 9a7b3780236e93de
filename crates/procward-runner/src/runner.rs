use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::error::RunnerError;
use crate::result::CommandResult;
use crate::spawner::{OsSpawner, Spawner};
use crate::LaunchSpec;

/// Time budget used when the caller does not supply one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

// ============================================================================
// CommandRunner - Bounded one-shot execution
// ============================================================================

/// Runs a single command to completion or to its deadline.
///
/// Ordinary outcomes never produce an error:
///
/// * exited within the budget - `started == true`, `finished == true`
/// * overran the budget - killed with its descendants, `finished == false`
/// * declined by the launcher - `started == false`
///
/// Only invalid input and programs the OS cannot execute are errors.
///
/// # Threading
///
/// The call blocks. Internally a waiter thread collects both output streams
/// while the calling thread waits on the deadline, so a child writing more than
/// a pipe buffer never stalls.
///
/// # Example
///
/// ```rust,no_run
/// use procward_runner::CommandRunner;
/// use std::time::Duration;
///
/// let runner = CommandRunner::new();
/// let result = runner.run("ping", "127.0.0.1", Duration::from_millis(5))?;
/// assert!(result.started());
/// assert!(!result.finished());
/// # Ok::<(), procward_runner::RunnerError>(())
/// ```
#[derive(Debug, Clone)]
pub struct CommandRunner {
    spawner: Arc<dyn Spawner>,
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::with_spawner(Arc::new(OsSpawner::new()))
    }

    #[must_use]
    pub fn with_spawner(spawner: Arc<dyn Spawner>) -> Self {
        Self { spawner }
    }

    /// [`run`](Self::run) with the [`DEFAULT_TIMEOUT`] budget.
    pub fn run_default(&self, command: &str, arguments: &str) -> Result<CommandResult, RunnerError> {
        self.run(command, arguments, DEFAULT_TIMEOUT)
    }

    /// Execute `command` with the argument string `arguments`, waiting at most
    /// `timeout` for it to exit.
    ///
    /// A zero timeout never waits: the launched process is killed at once and
    /// reported as not finished.
    pub fn run(
        &self,
        command: &str,
        arguments: &str,
        timeout: Duration,
    ) -> Result<CommandResult, RunnerError> {
        if command.is_empty() {
            return Err(RunnerError::InvalidArgument {
                name: "command",
                reason: "command must not be empty".to_string(),
            });
        }

        let spec = LaunchSpec::new(command).arguments(arguments);
        let command_line = spec.command_line();

        let Some(spawned) = self.spawner.spawn(&spec)? else {
            debug!(command = %command_line, "Launcher declined to start command");
            return Ok(CommandResult::not_started(command_line));
        };

        let (child, killer) = spawned.into_parts();
        let pid = killer.pid();
        let stopwatch = Instant::now();

        let (tx, rx) = mpsc::channel();
        let waiter = thread::Builder::new()
            .name(format!("procward-wait-{pid}"))
            .spawn(move || {
                let _ = tx.send(child.wait_with_output());
            });
        let waiter = match waiter {
            Ok(handle) => handle,
            Err(e) => {
                let _ = killer.kill_tree();
                return Err(RunnerError::control(pid, "monitor", e));
            }
        };

        let completed = if timeout.is_zero() {
            None
        } else {
            match rx.recv_timeout(timeout) {
                Ok(output) => Some(output),
                Err(mpsc::RecvTimeoutError::Timeout) => None,
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    let _ = killer.kill_tree();
                    return Err(RunnerError::control(
                        pid,
                        "monitor",
                        "waiter thread terminated unexpectedly",
                    ));
                }
            }
        };
        let elapsed = stopwatch.elapsed();
        let finished = completed.is_some();

        let output = match completed {
            Some(output) => output,
            None => {
                killer
                    .kill_tree()
                    .map_err(|e| RunnerError::control(pid, "kill", e))?;
                rx.recv().map_err(|_| {
                    RunnerError::control(pid, "monitor", "waiter thread terminated unexpectedly")
                })?
            }
        };
        let _ = waiter.join();

        let output = output.map_err(|e| RunnerError::control(pid, "collect output of", e))?;
        let runtime = u32::try_from(elapsed.as_millis()).unwrap_or(u32::MAX);

        if finished {
            debug!(command = %command_line, pid, elapsed_ms = runtime, "Command finished");
        } else {
            warn!(
                command = %command_line,
                pid,
                timeout_ms = budget_millis(timeout),
                "Command exceeded its time budget and was killed"
            );
        }

        Ok(CommandResult::new(
            command_line,
            finished,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
            runtime,
        ))
    }
}

/// Budget in whole milliseconds for log fields, saturating at `u64::MAX`.
fn budget_millis(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
}

/// Run a command through the OS with the given budget.
pub fn run_command(
    command: &str,
    arguments: &str,
    timeout: Duration,
) -> Result<CommandResult, RunnerError> {
    CommandRunner::new().run(command, arguments, timeout)
}
