use std::io;

use nix::errno::Errno;
use nix::sys::signal::{Signal, killpg};
use nix::unistd::Pid;

/// Put the child in a new process group led by itself so the whole tree can be
/// signalled at once.
pub(super) fn new_process_group(cmd: &mut std::process::Command) {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0);
}

/// Send SIGKILL to every member of the process group led by `pid`.
///
/// A group that no longer exists counts as already terminated.
pub(super) fn kill_process_group(pid: u32) -> io::Result<()> {
    let pgid = Pid::from_raw(pid as i32);
    match killpg(pgid, Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(errno) => Err(io::Error::from(errno)),
    }
}

pub(super) fn raise_current_priority() -> io::Result<()> {
    // SAFETY: setpriority only reads its integer arguments.
    let rc = unsafe { libc::setpriority(libc::PRIO_PROCESS, 0, -10) };
    if rc == -1 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
