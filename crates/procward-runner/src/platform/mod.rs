//! Platform glue for process-tree termination and host priority
//!
//! Unix children are started as leaders of a fresh process group and killed with
//! `killpg`. Windows children are assigned to a kill-on-close Job Object that is
//! terminated as a whole.

use std::io;
use std::process::{Child, Command};

use crate::error::RunnerError;

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows_job;

/// Kills a spawned child together with its descendants.
///
/// Independent of the `Child` handle so a waiter thread can own the child while
/// another thread holds the killer.
pub struct TreeKiller {
    pid: u32,
    #[cfg(windows)]
    job: Option<windows_job::JobObjectHandle>,
}

impl std::fmt::Debug for TreeKiller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeKiller").field("pid", &self.pid).finish()
    }
}

impl TreeKiller {
    #[must_use]
    pub const fn pid(&self) -> u32 {
        self.pid
    }

    /// Forcibly terminate the process tree.
    ///
    /// Terminating a tree that is already gone is not an error.
    pub fn kill_tree(&self) -> io::Result<()> {
        #[cfg(unix)]
        {
            unix::kill_process_group(self.pid)
        }

        #[cfg(windows)]
        {
            match &self.job {
                Some(job) => job.terminate(),
                None => Err(io::Error::other("process is not assigned to a job object")),
            }
        }

        #[cfg(not(any(unix, windows)))]
        {
            Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "process-tree termination is not supported on this platform",
            ))
        }
    }
}

/// Configure a command so its future process tree can be killed as a unit.
pub(crate) fn prepare_command(cmd: &mut Command) {
    #[cfg(unix)]
    unix::new_process_group(cmd);

    #[cfg(not(unix))]
    let _ = cmd;
}

/// Build the tree killer for a freshly spawned child.
pub(crate) fn attach(child: &Child) -> TreeKiller {
    let pid = child.id();

    #[cfg(windows)]
    {
        let job = match windows_job::assign_to_new_job(child) {
            Ok(job) => Some(job),
            Err(e) => {
                tracing::warn!(pid, error = %e, "Failed to assign process to a job object; only the direct child can be killed");
                None
            }
        };
        TreeKiller { pid, job }
    }

    #[cfg(not(windows))]
    {
        TreeKiller { pid }
    }
}

/// Kill `child` and its descendants, falling back to killing only the direct
/// child when tree termination is unavailable.
pub(crate) fn kill_child_tree(killer: &TreeKiller, child: &mut Child) -> io::Result<()> {
    if let Err(e) = killer.kill_tree() {
        tracing::warn!(pid = killer.pid, error = %e, "Process-tree kill failed, killing direct child");
        match child.kill() {
            Ok(()) => {}
            Err(kill_err) if kill_err.kind() == io::ErrorKind::InvalidInput => {}
            Err(kill_err) => return Err(kill_err),
        }
    }
    Ok(())
}

/// Raise the scheduling priority of the current (host) process.
///
/// Usually requires elevated permissions; callers typically log the error and
/// carry on at normal priority.
pub fn raise_current_priority() -> Result<(), RunnerError> {
    let pid = std::process::id();

    #[cfg(unix)]
    let result = unix::raise_current_priority();

    #[cfg(windows)]
    let result = windows_job::raise_current_priority();

    #[cfg(not(any(unix, windows)))]
    let result: io::Result<()> = Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "priority changes are not supported on this platform",
    ));

    result.map_err(|e| RunnerError::control(pid, "raise priority of", e))
}
