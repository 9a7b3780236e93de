//! CLI entry point and dispatch logic
//!
//! `run()` parses arguments, loads configuration, installs logging, then
//! dispatches to a command handler. It owns all error output.

use clap::Parser;
use std::io::{self, Write};
use tracing::{debug, warn};

use procward_runner::{ProcessRegistry, platform};

use super::args::{Cli, Commands};
use super::commands;
use crate::error::ProcwardError;
use crate::logging::init_tracing;
use crate::{CliArgs, Config, ExitCode};

/// Main CLI execution function.
///
/// Returns `Err(ExitCode)` after printing the error report; main.rs only maps
/// that to `std::process::exit`.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    let cli_args = CliArgs {
        config_path: cli.config.clone(),
        timeout_ms: cli.command.timeout_ms(),
        raise_priority: cli.raise_priority.then_some(true),
        verbose: Some(cli.verbose),
        log_format: cli.log_format.clone(),
    };

    let config = match Config::discover(&cli_args) {
        Ok(config) => config,
        Err(err) => {
            let err = ProcwardError::from(err);
            eprint!("{}", err.display_for_user());
            return Err(err.to_exit_code());
        }
    };

    // A subscriber installed by an embedding host is kept.
    let _ = init_tracing(config.logging.verbose, config.logging.format);
    debug!(command = cli.command.name(), "Configuration loaded");

    if config.runner.raise_priority
        && let Err(e) = platform::raise_current_priority()
    {
        warn!(error = %e, "Could not raise process priority; continuing at normal priority");
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = dispatch(&mut out, cli.command, &config);
    let _ = out.flush();

    if let Err(err) = result {
        eprint!("{}", err.display_for_user());
        return Err(err.to_exit_code());
    }
    Ok(())
}

fn dispatch(out: &mut dyn Write, command: Commands, config: &Config) -> Result<(), ProcwardError> {
    let timeout = config.default_timeout();
    match command {
        Commands::Run {
            command, arguments, ..
        } => commands::execute_run_command(out, &command, &arguments, timeout),
        Commands::Supervise {
            command, arguments, ..
        } => {
            let registry = ProcessRegistry::new();
            commands::execute_supervise_command(out, &registry, &command, &arguments, timeout)
        }
        Commands::Config => commands::execute_config_command(out, config),
    }
}
