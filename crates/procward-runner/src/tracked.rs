//! A registry entry: one live child plus its captured output

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, MutexGuard};
use std::io::{self, Read};
use std::process::{Child, ExitStatus};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::error::RunnerError;
use crate::platform::{self, TreeKiller};
use crate::spawner::SpawnedChild;
use crate::types::{ProcessId, ProcessInfo};
use crate::LaunchSpec;

/// Interval between exit checks while waiting on a tracked process.
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Accumulated text of one output stream plus the pipe it is drained from.
struct CapturedStream {
    pipe: Option<Box<dyn Read + Send>>,
    text: String,
}

impl CapturedStream {
    fn new(pipe: Option<Box<dyn Read + Send>>) -> Self {
        Self {
            pipe,
            text: String::new(),
        }
    }

    /// Move everything the pipe still holds into `text`.
    ///
    /// Reads until the child closes its end, then drops the pipe so later calls
    /// only return the accumulated text.
    fn drain(&mut self) -> io::Result<()> {
        if let Some(mut pipe) = self.pipe.take() {
            let mut bytes = Vec::new();
            let read = pipe.read_to_end(&mut bytes);
            self.text.push_str(&String::from_utf8_lossy(&bytes));
            if let Err(e) = read {
                self.pipe = Some(pipe);
                return Err(e);
            }
        }
        Ok(())
    }

    fn release(&mut self) {
        self.pipe = None;
    }
}

/// Both output streams of one child.
///
/// They are always drained together: a child blocked writing to a full stderr
/// pipe never closes stdout, so reading one pipe alone can hang.
struct CapturedOutput {
    stdout: CapturedStream,
    stderr: CapturedStream,
}

impl CapturedOutput {
    /// Drain both pipes to EOF, stderr on a scoped thread.
    fn drain(&mut self) -> io::Result<()> {
        let Self { stdout, stderr } = self;
        if stdout.pipe.is_none() {
            return stderr.drain();
        }
        if stderr.pipe.is_none() {
            return stdout.drain();
        }

        thread::scope(|scope| {
            let stderr_reader = scope.spawn(|| stderr.drain());
            let stdout_result = stdout.drain();
            let stderr_result = stderr_reader
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("standard error reader panicked")));
            stdout_result.and(stderr_result)
        })
    }

    fn release(&mut self) {
        self.stdout.release();
        self.stderr.release();
    }
}

struct ChildSlot {
    child: Child,
    killer: TreeKiller,
    status: Option<ExitStatus>,
}

impl ChildSlot {
    fn poll_exit(&mut self) -> io::Result<bool> {
        if self.status.is_none() {
            self.status = self.child.try_wait()?;
        }
        Ok(self.status.is_some())
    }
}

/// One tracked child process.
///
/// The child handle and the captured output sit behind separate locks: a drain
/// blocked on a running process never blocks `kill` on the same entry.
pub(crate) struct TrackedProcess {
    id: ProcessId,
    spec: LaunchSpec,
    pid: u32,
    started_at: DateTime<Utc>,
    child: Mutex<ChildSlot>,
    captured: Mutex<CapturedOutput>,
}

impl TrackedProcess {
    pub(crate) fn new(id: ProcessId, spec: LaunchSpec, spawned: SpawnedChild) -> Self {
        let (mut child, killer) = spawned.into_parts();
        let stdout = child
            .stdout
            .take()
            .map(|pipe| Box::new(pipe) as Box<dyn Read + Send>);
        let stderr = child
            .stderr
            .take()
            .map(|pipe| Box::new(pipe) as Box<dyn Read + Send>);

        Self {
            id,
            spec,
            pid: child.id(),
            started_at: Utc::now(),
            child: Mutex::new(ChildSlot {
                child,
                killer,
                status: None,
            }),
            captured: Mutex::new(CapturedOutput {
                stdout: CapturedStream::new(stdout),
                stderr: CapturedStream::new(stderr),
            }),
        }
    }

    pub(crate) const fn pid(&self) -> u32 {
        self.pid
    }

    /// Drain both pipes and hold the output lock for the caller.
    fn drain(&self) -> Result<MutexGuard<'_, CapturedOutput>, RunnerError> {
        let mut captured = self.captured.lock();
        captured
            .drain()
            .map_err(|e| RunnerError::control(self.pid, "read output of", e))?;
        Ok(captured)
    }

    pub(crate) fn output(&self) -> Result<String, RunnerError> {
        let captured = self.drain()?;
        let text = captured.stdout.text.clone();
        debug!(process_id = %self.id, bytes = text.len(), "Drained standard output");
        Ok(text)
    }

    pub(crate) fn error_output(&self) -> Result<String, RunnerError> {
        let captured = self.drain()?;
        let text = captured.stderr.text.clone();
        debug!(process_id = %self.id, bytes = text.len(), "Drained standard error");
        Ok(text)
    }

    /// Kill the process tree and reap the child.
    ///
    /// A child already known to have exited is left alone.
    pub(crate) fn kill(&self) -> Result<(), RunnerError> {
        let mut slot = self.child.lock();
        if slot.status.is_some() {
            debug!(process_id = %self.id, "Kill requested for an exited process");
            return Ok(());
        }

        let ChildSlot { child, killer, .. } = &mut *slot;
        platform::kill_child_tree(killer, child)
            .map_err(|e| RunnerError::control(self.pid, "kill", e))?;
        let status = child
            .wait()
            .map_err(|e| RunnerError::control(self.pid, "reap", e))?;
        slot.status = Some(status);
        Ok(())
    }

    pub(crate) fn has_exited(&self) -> Result<bool, RunnerError> {
        self.child
            .lock()
            .poll_exit()
            .map_err(|e| RunnerError::control(self.pid, "query", e))
    }

    /// Block until the process exits or `timeout` elapses; `None` waits forever.
    ///
    /// Returns whether the process has exited.
    pub(crate) fn wait_for_exit(&self, timeout: Option<Duration>) -> Result<bool, RunnerError> {
        let deadline = timeout.map(|t| Instant::now() + t);
        loop {
            if self.has_exited()? {
                return Ok(true);
            }
            let pause = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Ok(false);
                    }
                    EXIT_POLL_INTERVAL.min(deadline - now)
                }
                None => EXIT_POLL_INTERVAL,
            };
            thread::sleep(pause);
        }
    }

    /// Kill the process and release its pipes.
    pub(crate) fn dispose(&self) -> Result<(), RunnerError> {
        let killed = self.kill();
        self.captured.lock().release();
        killed
    }

    pub(crate) fn info(&self) -> ProcessInfo {
        let exited = self.child.lock().status.is_some();
        ProcessInfo {
            id: self.id,
            pid: self.pid,
            program: self.spec.program_display(),
            arguments: self.spec.arguments.clone(),
            started_at: self.started_at,
            exited,
        }
    }
}

impl Drop for TrackedProcess {
    fn drop(&mut self) {
        let slot = self.child.get_mut();
        if slot.status.is_some() {
            return;
        }
        if let Ok(Some(status)) = slot.child.try_wait() {
            slot.status = Some(status);
            return;
        }
        let ChildSlot { child, killer, .. } = slot;
        match platform::kill_child_tree(killer, child) {
            Ok(()) => {
                let _ = child.wait();
                debug!(process_id = %self.id, pid = self.pid, "Killed process on drop");
            }
            Err(e) => {
                warn!(process_id = %self.id, pid = self.pid, error = %e, "Failed to kill process on drop");
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::spawner::{OsSpawner, Spawner};

    fn track(spec: LaunchSpec) -> TrackedProcess {
        let spawned = OsSpawner::new().spawn(&spec).unwrap().unwrap();
        TrackedProcess::new(ProcessId::new(), spec, spawned)
    }

    #[test]
    fn test_drain_is_cumulative_and_never_duplicates() {
        let tracked = track(LaunchSpec::new("echo").arguments("Hello World!"));
        let first = tracked.output().unwrap();
        let second = tracked.output().unwrap();
        assert_eq!(first.trim(), "Hello World!");
        assert_eq!(first, second);
    }

    #[test]
    fn test_stdout_drain_does_not_stall_on_full_stderr() {
        let tracked = track(
            LaunchSpec::new("sh").arguments(r#"-c "head -c 200000 /dev/zero >&2; echo done""#),
        );
        assert_eq!(tracked.output().unwrap().trim(), "done");
        // stderr was collected by the same drain
        assert_eq!(tracked.error_output().unwrap().len(), 200_000);
        assert!(tracked.wait_for_exit(Some(Duration::from_secs(5))).unwrap());
    }

    #[test]
    fn test_kill_then_wait_reports_exit() {
        let tracked = track(LaunchSpec::new("sleep").arguments("30"));
        assert!(!tracked.has_exited().unwrap());
        tracked.kill().unwrap();
        assert!(tracked.has_exited().unwrap());
        // Second kill is a no-op
        tracked.kill().unwrap();
        assert!(tracked.info().exited);
    }

    #[test]
    fn test_wait_for_exit_times_out_on_running_process() {
        let tracked = track(LaunchSpec::new("sleep").arguments("30"));
        let exited = tracked
            .wait_for_exit(Some(Duration::from_millis(50)))
            .unwrap();
        assert!(!exited);
        tracked.dispose().unwrap();
        assert!(tracked.has_exited().unwrap());
    }

    #[test]
    fn test_unredirected_stream_reads_empty() {
        let spec = LaunchSpec::new("true").redirect(true, false);
        let tracked = track(spec);
        assert!(tracked.wait_for_exit(None).unwrap());
        assert_eq!(tracked.error_output().unwrap(), "");
    }

    #[test]
    fn test_info_reflects_launch_spec() {
        let tracked = track(LaunchSpec::new("sleep").arguments("5"));
        let info = tracked.info();
        assert_eq!(info.program, "sleep");
        assert_eq!(info.arguments, "5");
        assert_eq!(info.pid, tracked.pid());
        assert!(!info.exited);
    }
}
