use std::io;
use std::os::windows::io::AsRawHandle;
use std::process::Child;

use windows::Win32::Foundation::{CloseHandle, HANDLE};

/// RAII wrapper for a Windows Job Object handle
///
/// The job is created with `JOB_OBJECT_LIMIT_KILL_ON_JOB_CLOSE`, so closing the
/// last handle also terminates every process still assigned to it.
pub(super) struct JobObjectHandle {
    handle: HANDLE,
}

// SAFETY: Windows HANDLEs are opaque kernel object references usable from any thread.
unsafe impl Send for JobObjectHandle {}

impl Drop for JobObjectHandle {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.handle);
        }
    }
}

impl JobObjectHandle {
    /// Terminate every process in the job.
    pub(super) fn terminate(&self) -> io::Result<()> {
        use windows::Win32::System::JobObjects::TerminateJobObject;

        unsafe { TerminateJobObject(self.handle, 1) }.map_err(io::Error::other)
    }
}

/// Create a kill-on-close job object and assign the child to it.
pub(super) fn assign_to_new_job(child: &Child) -> io::Result<JobObjectHandle> {
    use windows::Win32::System::JobObjects::{
        AssignProcessToJobObject, CreateJobObjectW, JOB_OBJECT_LIMIT_KILL_ON_JOB_CLOSE,
        JOBOBJECT_EXTENDED_LIMIT_INFORMATION, JobObjectExtendedLimitInformation,
        SetInformationJobObject,
    };

    unsafe {
        let job = JobObjectHandle {
            handle: CreateJobObjectW(None, None).map_err(io::Error::other)?,
        };

        let mut info: JOBOBJECT_EXTENDED_LIMIT_INFORMATION = std::mem::zeroed();
        info.BasicLimitInformation.LimitFlags = JOB_OBJECT_LIMIT_KILL_ON_JOB_CLOSE;

        SetInformationJobObject(
            job.handle,
            JobObjectExtendedLimitInformation,
            (&raw const info).cast(),
            std::mem::size_of::<JOBOBJECT_EXTENDED_LIMIT_INFORMATION>() as u32,
        )
        .map_err(io::Error::other)?;

        AssignProcessToJobObject(job.handle, HANDLE(child.as_raw_handle()))
            .map_err(io::Error::other)?;

        Ok(job)
    }
}

pub(super) fn raise_current_priority() -> io::Result<()> {
    use windows::Win32::System::Threading::{
        GetCurrentProcess, HIGH_PRIORITY_CLASS, SetPriorityClass,
    };

    unsafe { SetPriorityClass(GetCurrentProcess(), HIGH_PRIORITY_CLASS) }.map_err(io::Error::other)
}
