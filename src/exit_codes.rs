//! Process exit codes of the procward binary

/// Type-safe exit code returned by [`cli::run`](crate::cli::run).
///
/// | Exit Code | Name | Description |
/// |-----------|------|-------------|
/// | 0 | SUCCESS | Completed successfully |
/// | 1 | INTERNAL | General failure |
/// | 2 | CLI_ARGS | Invalid arguments or configuration |
/// | 4 | NOT_FOUND | Unknown process identifier |
/// | 127 | LAUNCH_FAILURE | Program could not be executed |
///
/// ```rust
/// use procward::ExitCode;
///
/// assert_eq!(ExitCode::LAUNCH_FAILURE.as_i32(), 127);
/// assert_eq!(ExitCode::SUCCESS, ExitCode::from_i32(0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - operation completed successfully
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// CLI arguments error - invalid arguments or configuration values
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    /// Not found - the process identifier is not tracked
    pub const NOT_FOUND: ExitCode = ExitCode(4);

    /// Launch failure - the program could not be executed, as shells report it
    pub const LAUNCH_FAILURE: ExitCode = ExitCode(127);

    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Prefer the named constants when possible.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}
