use std::fmt;
use std::process::{Child, Stdio};

use tracing::debug;

use crate::LaunchSpec;
use crate::error::RunnerError;
use crate::platform::{self, TreeKiller};

// ============================================================================
// Spawner Trait - The OS launch seam
// ============================================================================

/// A freshly launched child together with the handle that kills its tree.
#[derive(Debug)]
pub struct SpawnedChild {
    child: Child,
    killer: TreeKiller,
}

impl SpawnedChild {
    pub(crate) fn new(child: Child) -> Self {
        let killer = platform::attach(&child);
        Self { child, killer }
    }

    /// OS process id of the direct child.
    #[must_use]
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    pub(crate) fn into_parts(self) -> (Child, TreeKiller) {
        (self.child, self.killer)
    }
}

/// Trait for launching processes.
///
/// The result distinguishes two different refusal signals and callers must keep
/// them apart:
///
/// * `Err(RunnerError::LaunchFailure)` - the OS could not execute the program
///   (missing executable, permission denied)
/// * `Ok(None)` - the launcher declined to start a process without raising an
///   error
///
/// # Example
///
/// ```rust
/// use procward_runner::{LaunchSpec, RunnerError, SpawnedChild, Spawner};
///
/// /// Never starts anything, e.g. while the host is shutting down.
/// #[derive(Debug)]
/// struct Paused;
///
/// impl Spawner for Paused {
///     fn spawn(&self, _spec: &LaunchSpec) -> Result<Option<SpawnedChild>, RunnerError> {
///         Ok(None)
///     }
/// }
///
/// assert!(Paused.spawn(&LaunchSpec::new("ls")).unwrap().is_none());
/// ```
pub trait Spawner: Send + Sync + fmt::Debug {
    fn spawn(&self, spec: &LaunchSpec) -> Result<Option<SpawnedChild>, RunnerError>;
}

/// Spawner backed by `std::process::Command`.
///
/// Stdin is closed, redirected streams are piped, and the child is set up so
/// its whole process tree can be killed later.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsSpawner;

impl OsSpawner {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn stream(redirect: bool) -> Stdio {
    if redirect { Stdio::piped() } else { Stdio::inherit() }
}

impl Spawner for OsSpawner {
    fn spawn(&self, spec: &LaunchSpec) -> Result<Option<SpawnedChild>, RunnerError> {
        spec.validate()?;

        let mut command = spec.to_command();
        command
            .stdin(Stdio::null())
            .stdout(stream(spec.redirect_stdout))
            .stderr(stream(spec.redirect_stderr));
        platform::prepare_command(&mut command);

        let child = command.spawn().map_err(|e| RunnerError::LaunchFailure {
            program: spec.program_display(),
            reason: e.to_string(),
        })?;

        debug!(pid = child.id(), program = %spec.program_display(), "Spawned process");
        Ok(Some(SpawnedChild::new(child)))
    }
}
