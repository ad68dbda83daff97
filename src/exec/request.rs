// src/exec/request.rs

use std::path::PathBuf;
use std::time::Duration;

/// One command to run, as handed over by the caller.
///
/// Unset fields fall back to the executor's configured defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    /// Shell command line, interpreted by `sh -c` exactly as typed.
    pub command: String,
    pub timeout: Option<Duration>,
    pub working_directory: Option<PathBuf>,
    /// Report what would run without spawning anything.
    pub dry_run: bool,
}

impl ExecutionRequest {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            timeout: None,
            working_directory: None,
            dry_run: false,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout_secs(self, secs: u64) -> Self {
        self.timeout(Duration::from_secs(secs))
    }

    pub fn working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

impl From<&str> for ExecutionRequest {
    fn from(command: &str) -> Self {
        Self::new(command)
    }
}
