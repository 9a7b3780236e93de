use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

use crate::error::RunnerError;

// ============================================================================
// LaunchSpec - What to start and how
// ============================================================================

/// Specification for a process to launch.
///
/// Arguments are carried as a single string, the way the host hands them over.
/// They are never interpreted by a shell: on Windows the string becomes the raw
/// command-line tail, elsewhere it is split by [`split_arguments`](crate::args::split_arguments).
///
/// # Example
///
/// ```rust
/// use procward_runner::LaunchSpec;
///
/// let spec = LaunchSpec::new("ping")
///     .arguments("-c 3 127.0.0.1")
///     .cwd("/tmp")
///     .env("LC_ALL", "C");
///
/// assert_eq!(spec.command_line(), "ping -c 3 127.0.0.1");
/// ```
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    /// The program to execute
    pub program: OsString,
    /// Arguments as one string, passed through unmodified
    pub arguments: String,
    /// Optional working directory
    pub cwd: Option<PathBuf>,
    /// Optional environment overrides
    pub env: Option<HashMap<OsString, OsString>>,
    /// Capture standard output through a pipe
    pub redirect_stdout: bool,
    /// Capture standard error through a pipe
    pub redirect_stderr: bool,
}

impl LaunchSpec {
    /// Create a new `LaunchSpec` for the given program with no arguments.
    ///
    /// Both output streams are redirected by default.
    #[must_use]
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            arguments: String::new(),
            cwd: None,
            env: None,
            redirect_stdout: true,
            redirect_stderr: true,
        }
    }

    /// Set the argument string.
    #[must_use]
    pub fn arguments(mut self, arguments: impl Into<String>) -> Self {
        self.arguments = arguments.into();
        self
    }

    /// Set the working directory for the process.
    #[must_use]
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Set an environment variable for the process.
    #[must_use]
    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Set multiple environment variables for the process.
    #[must_use]
    pub fn envs<I, K, V>(mut self, envs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        let env_map = self.env.get_or_insert_with(HashMap::new);
        for (key, value) in envs {
            env_map.insert(key.into(), value.into());
        }
        self
    }

    /// Choose which output streams are captured.
    #[must_use]
    pub const fn redirect(mut self, stdout: bool, stderr: bool) -> Self {
        self.redirect_stdout = stdout;
        self.redirect_stderr = stderr;
        self
    }

    /// The literal command line used for reporting: program, one space, arguments.
    #[must_use]
    pub fn command_line(&self) -> String {
        format!("{} {}", self.program.to_string_lossy(), self.arguments)
    }

    /// Program name for log fields and error messages.
    #[must_use]
    pub fn program_display(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Reject specifications that cannot name a program.
    pub fn validate(&self) -> Result<(), RunnerError> {
        if self.program.is_empty() {
            return Err(RunnerError::InvalidArgument {
                name: "program",
                reason: "program must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Build a `std::process::Command` for this specification.
    ///
    /// Stdio wiring and process-tree setup are left to the spawner.
    #[must_use]
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            if !self.arguments.is_empty() {
                cmd.raw_arg(&self.arguments);
            }
        }

        #[cfg(not(windows))]
        cmd.args(crate::args::split_arguments(&self.arguments));

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        if let Some(ref env) = self.env {
            cmd.envs(env);
        }

        cmd
    }
}
