// src/exec/result.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Exit code reported when a command was killed for exceeding its timeout
/// and the OS supplied none.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Exit code used when the command never ran (bad cwd, spawn failure, ...).
pub const FAILURE_EXIT_CODE: i32 = 1;

/// Placeholder stdout of a dry run.
pub const DRY_RUN_STDOUT: &str = "[DRY RUN] Command would be executed";

/// Outcome of one execution attempt.
///
/// Built once at the end of the attempt and never modified afterwards; the
/// fields are only readable through accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    command: String,
    exit_code: i32,
    stdout: String,
    stderr: String,
    elapsed: Duration,
    timed_out: bool,
    truncated: bool,
    working_directory: PathBuf,
}

/// Field bundle for [`ExecutionResult::from_parts`].
#[derive(Debug, Clone)]
pub(crate) struct ResultParts {
    pub command: String,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
    pub timed_out: bool,
    pub truncated: bool,
    pub working_directory: PathBuf,
}

impl ExecutionResult {
    pub(crate) fn from_parts(parts: ResultParts) -> Self {
        Self {
            command: parts.command,
            exit_code: parts.exit_code,
            stdout: parts.stdout,
            stderr: parts.stderr,
            elapsed: parts.elapsed,
            timed_out: parts.timed_out,
            truncated: parts.truncated,
            working_directory: parts.working_directory,
        }
    }

    /// A command that ran to completion within its limits.
    ///
    /// For [`ExecutorBackend`](crate::exec::ExecutorBackend) implementations
    /// outside this crate; the real executor builds its results internally.
    pub fn completed(
        command: impl Into<String>,
        exit_code: i32,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
        working_directory: impl Into<PathBuf>,
        elapsed: Duration,
    ) -> Self {
        Self::from_parts(ResultParts {
            command: command.into(),
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
            elapsed,
            timed_out: false,
            truncated: false,
            working_directory: working_directory.into(),
        })
    }

    /// Synthetic success returned for dry runs.
    pub fn dry_run(command: impl Into<String>, working_directory: impl Into<PathBuf>) -> Self {
        Self::from_parts(ResultParts {
            command: command.into(),
            exit_code: 0,
            stdout: DRY_RUN_STDOUT.to_string(),
            stderr: String::new(),
            elapsed: Duration::ZERO,
            timed_out: false,
            truncated: false,
            working_directory: working_directory.into(),
        })
    }

    /// An attempt that failed before or while spawning.
    pub fn failure(
        command: impl Into<String>,
        message: impl Into<String>,
        working_directory: impl Into<PathBuf>,
        elapsed: Duration,
    ) -> Self {
        Self::from_parts(ResultParts {
            command: command.into(),
            exit_code: FAILURE_EXIT_CODE,
            stdout: String::new(),
            stderr: message.into(),
            elapsed,
            timed_out: false,
            truncated: false,
            working_directory: working_directory.into(),
        })
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    pub fn truncated(&self) -> bool {
        self.truncated
    }

    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    /// Exit code 0 and not timed out.
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0 && !self.timed_out
    }

    /// stdout followed by stderr.
    pub fn combined_output(&self) -> String {
        let mut out = String::with_capacity(self.stdout.len() + self.stderr.len());
        out.push_str(&self.stdout);
        out.push_str(&self.stderr);
        out
    }
}
