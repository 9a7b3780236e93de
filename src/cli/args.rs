//! CLI argument definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// procward - supervise subprocesses and run commands under a time budget
#[derive(Parser, Debug)]
#[command(name = "procward")]
#[command(about = "Run commands under a time budget and supervise subprocesses")]
#[command(long_about = r#"
procward launches programs, captures their output, and kills the whole process
tree when a time budget runs out.

EXAMPLES:
  # Run a command with the default 10 second budget
  procward run echo "Hello World!"

  # Give ping 5 milliseconds, then kill it
  procward run ping 127.0.0.1 --timeout-ms 5

  # Start a tracked process, wait up to 2 seconds, then report and clean up
  procward supervise sleep 30 --timeout-ms 2000

  # Show the effective configuration and where each value came from
  procward config

CONFIGURATION:
  Configuration is loaded with precedence: CLI flags > config file > defaults
  Config file is discovered by searching upward from CWD for .procward/config.toml
  Use --config to specify an explicit config file path
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log format on stderr: compact or json
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Try to raise this host's scheduling priority before running anything
    #[arg(long, global = true)]
    pub raise_priority: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a command to completion or until the time budget runs out, print the result as JSON
    Run {
        /// Program to execute
        command: String,

        /// Argument string, passed through as one string
        #[arg(default_value = "", allow_hyphen_values = true)]
        arguments: String,

        /// Time budget in milliseconds (overrides runner.default_timeout_ms)
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// Start a tracked process, wait for it, kill it if still running, print a JSON report
    Supervise {
        /// Program to execute
        command: String,

        /// Argument string, passed through as one string
        #[arg(default_value = "", allow_hyphen_values = true)]
        arguments: String,

        /// How long to wait for exit in milliseconds (overrides runner.default_timeout_ms)
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// Print the effective configuration with value sources
    Config,
}

impl Commands {
    /// Per-command timeout override, if the subcommand takes one
    #[must_use]
    pub const fn timeout_ms(&self) -> Option<u64> {
        match self {
            Self::Run { timeout_ms, .. } | Self::Supervise { timeout_ms, .. } => *timeout_ms,
            Self::Config => None,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Run { .. } => "run",
            Self::Supervise { .. } => "supervise",
            Self::Config => "config",
        }
    }
}
