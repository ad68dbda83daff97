#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use cmdguard::config::{RawSettings, Settings};

/// Builder for `Settings` to simplify test setup.
///
/// Starts from the built-in defaults with command logging switched off, so
/// tests never touch the real history file unless they ask for it with
/// [`history_file`](Self::history_file).
pub struct SettingsBuilder {
    raw: RawSettings,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        let mut raw = RawSettings::default();
        raw.logging.log_commands = false;
        Self { raw }
    }

    pub fn command_timeout(mut self, secs: u64) -> Self {
        self.raw.execution.command_timeout = secs;
        self
    }

    pub fn max_output_size(mut self, bytes: usize) -> Self {
        self.raw.execution.max_output_size = bytes;
        self
    }

    pub fn max_concurrent_commands(mut self, n: usize) -> Self {
        self.raw.execution.max_concurrent_commands = n;
        self
    }

    pub fn working_directory(mut self, dir: &Path) -> Self {
        self.raw.execution.working_directory = Some(dir.to_path_buf());
        self
    }

    pub fn require_confirmation(mut self, val: bool) -> Self {
        self.raw.safety.require_confirmation = val;
        self
    }

    pub fn protect_name(mut self, name: &str) -> Self {
        self.raw.safety.protected_processes.push(name.to_string());
        self
    }

    pub fn protect_pid(mut self, pid: u32) -> Self {
        self.raw.safety.protected_pids.push(pid);
        self
    }

    pub fn dangerous_commands(mut self, commands: &[&str]) -> Self {
        self.raw.safety.dangerous_commands = commands.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Enable the audit log, writing to `path`.
    pub fn history_file(mut self, path: &Path) -> Self {
        self.raw.logging.log_commands = true;
        self.raw.logging.history_file = path.to_path_buf();
        self
    }

    pub fn raw(&self) -> &RawSettings {
        &self.raw
    }

    pub fn build(self) -> Arc<Settings> {
        Arc::new(Settings::try_from(self.raw).expect("Failed to build valid settings from builder"))
    }
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
