//! Registry of long-lived, explicitly tracked subprocesses

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::RunnerError;
use crate::spawner::{OsSpawner, Spawner};
use crate::tracked::TrackedProcess;
use crate::types::{ProcessId, ProcessInfo};
use crate::LaunchSpec;

static GLOBAL: Lazy<ProcessRegistry> = Lazy::new(ProcessRegistry::new);

/// Owns the set of tracked subprocesses, keyed by [`ProcessId`].
///
/// The table is guarded by a read/write lock: lookups share it, while `start`,
/// `remove` and `reset` take it exclusively. The lock is released before any
/// blocking process operation, so a long drain on one entry never stalls the
/// rest of the registry.
///
/// # Example
///
/// ```rust,no_run
/// use procward_runner::{LaunchSpec, ProcessRegistry};
/// use std::time::Duration;
///
/// let registry = ProcessRegistry::new();
/// let id = registry.start(LaunchSpec::new("ping").arguments("127.0.0.1"))?;
///
/// registry.wait_for_exit(id, Some(Duration::from_secs(2)))?;
/// registry.kill(id)?;
/// println!("{}", registry.output(id)?);
///
/// registry.remove(id)?;
/// assert!(!registry.contains(id));
/// # Ok::<(), procward_runner::RunnerError>(())
/// ```
pub struct ProcessRegistry {
    entries: RwLock<HashMap<ProcessId, Arc<TrackedProcess>>>,
    spawner: Arc<dyn Spawner>,
}

impl fmt::Debug for ProcessRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessRegistry")
            .field("tracked", &self.len())
            .field("spawner", &self.spawner)
            .finish()
    }
}

impl Default for ProcessRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRegistry {
    /// Create an empty registry that launches through the OS.
    #[must_use]
    pub fn new() -> Self {
        Self::with_spawner(Arc::new(OsSpawner::new()))
    }

    /// Create an empty registry with a custom launcher.
    #[must_use]
    pub fn with_spawner(spawner: Arc<dyn Spawner>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            spawner,
        }
    }

    /// Process-wide registry, created on first access and never torn down.
    ///
    /// Prefer an owned [`ProcessRegistry`] passed to consumers; this accessor
    /// exists for callers that have no instance at hand.
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Launch a process and start tracking it.
    ///
    /// Output redirection is forced on for both streams. The entry only becomes
    /// visible once the OS accepted the launch; a failed start leaves the
    /// registry unchanged.
    pub fn start(&self, spec: LaunchSpec) -> Result<ProcessId, RunnerError> {
        let spec = spec.redirect(true, true);
        spec.validate()?;

        let id = ProcessId::new();
        let program = spec.program_display();

        let spawned = match self.spawner.spawn(&spec) {
            Ok(Some(spawned)) => spawned,
            Ok(None) => {
                warn!(process_id = %id, program = %program, "Launcher declined to start process");
                return Err(RunnerError::LaunchFailure {
                    program,
                    reason: format!("process [{id}] was not started"),
                });
            }
            Err(e) => {
                warn!(process_id = %id, program = %program, error = %e, "Failed to start process");
                return Err(e);
            }
        };

        let pid = spawned.pid();
        let entry = Arc::new(TrackedProcess::new(id, spec, spawned));
        self.entries.write().insert(id, entry);

        info!(process_id = %id, pid, program = %program, "Started tracked process");
        Ok(id)
    }

    fn lookup(&self, id: ProcessId) -> Result<Arc<TrackedProcess>, RunnerError> {
        self.entries
            .read()
            .get(&id)
            .cloned()
            .ok_or(RunnerError::NotFound { id })
    }

    /// All standard output captured so far.
    ///
    /// Drains both pipes until the child closes them, which for a running
    /// process means this call blocks until the process exits or is killed.
    /// Standard error read along the way is kept for [`error_output`](Self::error_output).
    pub fn output(&self, id: ProcessId) -> Result<String, RunnerError> {
        self.lookup(id)?.output()
    }

    /// All standard error captured so far. Blocks like [`output`](Self::output).
    pub fn error_output(&self, id: ProcessId) -> Result<String, RunnerError> {
        self.lookup(id)?.error_output()
    }

    /// Forcibly terminate the process and its descendants.
    ///
    /// Killing a process that already exited is a no-op.
    pub fn kill(&self, id: ProcessId) -> Result<(), RunnerError> {
        let entry = self.lookup(id)?;
        entry.kill()?;
        info!(process_id = %id, pid = entry.pid(), "Killed tracked process");
        Ok(())
    }

    /// Kill the process, forget it and release its OS handles.
    ///
    /// The identifier is invalid for this registry afterwards.
    pub fn remove(&self, id: ProcessId) -> Result<(), RunnerError> {
        self.lookup(id)?.kill()?;

        let entry = self
            .entries
            .write()
            .remove(&id)
            .ok_or(RunnerError::NotFound { id })?;
        entry.dispose()?;

        info!(process_id = %id, "Removed tracked process");
        Ok(())
    }

    /// Kill every tracked process and empty the registry.
    ///
    /// The registry is always emptied. If some process could not be killed, the
    /// first such error is returned after the rest were handled.
    pub fn reset(&self) -> Result<(), RunnerError> {
        let drained: Vec<_> = self.entries.write().drain().collect();
        let count = drained.len();

        let mut first_error = None;
        for (id, entry) in drained {
            if let Err(e) = entry.dispose() {
                warn!(process_id = %id, error = %e, "Failed to kill process during reset");
                first_error.get_or_insert(e);
            }
        }

        info!(count, "Reset process registry");
        first_error.map_or(Ok(()), Err)
    }

    /// Block until the process exits or `timeout` elapses (`None` waits
    /// indefinitely). Returns whether it has exited.
    pub fn wait_for_exit(
        &self,
        id: ProcessId,
        timeout: Option<Duration>,
    ) -> Result<bool, RunnerError> {
        self.lookup(id)?.wait_for_exit(timeout)
    }

    pub fn has_exited(&self, id: ProcessId) -> Result<bool, RunnerError> {
        self.lookup(id)?.has_exited()
    }

    pub fn info(&self, id: ProcessId) -> Result<ProcessInfo, RunnerError> {
        Ok(self.lookup(id)?.info())
    }

    #[must_use]
    pub fn contains(&self, id: ProcessId) -> bool {
        self.entries.read().contains_key(&id)
    }

    #[must_use]
    pub fn ids(&self) -> Vec<ProcessId> {
        self.entries.read().keys().copied().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spawner::SpawnedChild;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Launcher that declines every launch without an error.
    #[derive(Debug, Default)]
    struct DecliningSpawner {
        calls: AtomicUsize,
    }

    impl Spawner for DecliningSpawner {
        fn spawn(&self, _spec: &LaunchSpec) -> Result<Option<SpawnedChild>, RunnerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }
    }

    #[test]
    fn test_unknown_id_is_not_found_everywhere() {
        let registry = ProcessRegistry::new();
        let id = ProcessId::new();

        assert!(registry.output(id).unwrap_err().is_not_found());
        assert!(registry.error_output(id).unwrap_err().is_not_found());
        assert!(registry.kill(id).unwrap_err().is_not_found());
        assert!(registry.remove(id).unwrap_err().is_not_found());
        assert!(registry.has_exited(id).unwrap_err().is_not_found());
        assert!(registry.info(id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_reset_on_empty_registry() {
        let registry = ProcessRegistry::new();
        registry.reset().unwrap();
        registry.reset().unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_declined_start_is_launch_failure_and_rolls_back() {
        let spawner = Arc::new(DecliningSpawner::default());
        let registry = ProcessRegistry::with_spawner(spawner.clone());

        let err = registry.start(LaunchSpec::new("ls")).unwrap_err();
        assert!(err.is_launch_failure());
        assert_eq!(spawner.calls.load(Ordering::SeqCst), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_missing_executable_is_not_registered() {
        let registry = ProcessRegistry::new();
        let err = registry
            .start(LaunchSpec::new("NotExistingSoftwareThatShouldFail"))
            .unwrap_err();
        assert!(err.is_launch_failure());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_empty_program_is_invalid_argument() {
        let registry = ProcessRegistry::new();
        assert!(matches!(
            registry.start(LaunchSpec::new("")),
            Err(RunnerError::InvalidArgument { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_start_forces_redirection() {
        let registry = ProcessRegistry::new();
        let id = registry
            .start(LaunchSpec::new("echo").arguments("captured").redirect(false, false))
            .unwrap();
        assert_eq!(registry.output(id).unwrap().trim(), "captured");
        registry.remove(id).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_remove_invalidates_id() {
        let registry = ProcessRegistry::new();
        let id = registry.start(LaunchSpec::new("sleep").arguments("30")).unwrap();
        assert!(registry.contains(id));
        assert_eq!(registry.ids(), vec![id]);

        registry.remove(id).unwrap();
        assert!(!registry.contains(id));
        assert!(registry.remove(id).unwrap_err().is_not_found());
        assert!(registry.output(id).unwrap_err().is_not_found());
    }

    #[cfg(unix)]
    #[test]
    fn test_kill_unblocks_concurrent_drain() {
        let registry = Arc::new(ProcessRegistry::new());
        let id = registry.start(LaunchSpec::new("sleep").arguments("30")).unwrap();

        let reader = {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || registry.output(id))
        };
        std::thread::sleep(Duration::from_millis(50));
        registry.kill(id).unwrap();

        let text = reader.join().unwrap().unwrap();
        assert!(text.is_empty());
        assert!(registry.has_exited(id).unwrap());
    }
}
