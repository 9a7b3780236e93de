//! Command implementations
//!
//! Each command writes its report to the given writer; `run` passes stdout.

use serde::Serialize;
use std::io::Write;
use std::time::Duration;
use tracing::{debug, info};

use procward_runner::{CommandRunner, LaunchSpec, ProcessId, ProcessRegistry};

use crate::error::ProcwardError;
use crate::Config;

/// Outcome of `procward supervise`
#[derive(Debug, Clone, Serialize)]
pub struct SuperviseReport {
    pub id: ProcessId,
    pub pid: u32,
    /// Exited on its own within the wait budget
    pub exited: bool,
    pub output: String,
    pub error: String,
}

/// Execute `procward run`: one bounded command, result as JSON.
pub(crate) fn execute_run_command(
    out: &mut dyn Write,
    command: &str,
    arguments: &str,
    timeout: Duration,
) -> Result<(), ProcwardError> {
    let result = CommandRunner::new().run(command, arguments, timeout)?;
    debug!(
        command = %result.command(),
        finished = result.finished(),
        runtime_ms = result.runtime(),
        "Run complete"
    );
    serde_json::to_writer_pretty(&mut *out, &result)?;
    writeln!(out)?;
    Ok(())
}

/// Execute `procward supervise` against `registry`.
///
/// The process is always removed from the registry before returning, also
/// when reading its output fails.
pub(crate) fn execute_supervise_command(
    out: &mut dyn Write,
    registry: &ProcessRegistry,
    command: &str,
    arguments: &str,
    wait: Duration,
) -> Result<(), ProcwardError> {
    let id = registry.start(LaunchSpec::new(command).arguments(arguments))?;
    let report = collect_report(registry, id, wait);
    let removed = registry.remove(id);

    let report = report?;
    removed?;

    info!(process_id = %id, exited = report.exited, "Supervised process finished");
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

fn collect_report(
    registry: &ProcessRegistry,
    id: ProcessId,
    wait: Duration,
) -> Result<SuperviseReport, ProcwardError> {
    let exited = registry.wait_for_exit(id, Some(wait))?;
    if !exited {
        registry.kill(id)?;
    }
    let info = registry.info(id)?;
    Ok(SuperviseReport {
        id,
        pid: info.pid,
        exited,
        output: registry.output(id)?,
        error: registry.error_output(id)?,
    })
}

/// Execute `procward config`: effective values and their sources.
pub(crate) fn execute_config_command(
    out: &mut dyn Write,
    config: &Config,
) -> Result<(), ProcwardError> {
    match &config.config_path {
        Some(path) => writeln!(out, "# config file: {}", path.display())?,
        None => writeln!(out, "# config file: none")?,
    }
    for (key, (value, source)) in config.effective_config() {
        writeln!(out, "{key} = {value}  ({source})")?;
    }
    Ok(())
}
