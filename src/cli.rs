// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `cmdguard`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cmdguard",
    version,
    about = "Run shell commands with timeouts, output limits and a safety policy.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `cmdguard/config.toml` in the platform config directory,
    /// falling back to built-in defaults when that file does not exist.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CMDGUARD_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Check a command against the safety policy and run it.
    Run {
        /// Timeout in seconds (overrides `execution.command_timeout`).
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Working directory for the command.
        #[arg(long, value_name = "DIR")]
        cwd: Option<PathBuf>,

        /// Show what would run without spawning anything.
        #[arg(long)]
        dry_run: bool,

        /// Answer yes to the confirmation prompt.
        #[arg(long, short = 'y')]
        yes: bool,

        /// The shell command. Words are joined with spaces.
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Print the safety verdict for a command without running it.
    Check {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Print whether a PID or process/service name is protected.
    Protected {
        #[arg(allow_hyphen_values = true)]
        identifier: String,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
