// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::safety::ProtectionPolicy;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [execution]
/// command_timeout = 30
/// max_output_size = 10485760
///
/// [safety]
/// require_confirmation = true
/// protected_processes = ["systemd", "init", "sshd"]
/// protected_pids = [1]
///
/// [logging]
/// log_commands = true
/// history_file = "~/.cmdguard_history"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawSettings {
    #[serde(default)]
    pub execution: ExecutionSection,

    #[serde(default)]
    pub safety: SafetySection,

    #[serde(default)]
    pub logging: LoggingSection,
}

/// `[execution]` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExecutionSection {
    /// Default timeout in seconds when a request does not carry its own.
    #[serde(default = "default_command_timeout")]
    pub command_timeout: u64,

    /// Cap on combined stdout + stderr, in bytes.
    #[serde(default = "default_max_output_size")]
    pub max_output_size: usize,

    /// How many commands one executor runs at the same time.
    #[serde(default = "default_max_concurrent_commands")]
    pub max_concurrent_commands: usize,

    /// Default working directory; the caller's cwd when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<PathBuf>,
}

fn default_command_timeout() -> u64 {
    30
}

fn default_max_output_size() -> usize {
    10 * 1024 * 1024
}

fn default_max_concurrent_commands() -> usize {
    3
}

impl Default for ExecutionSection {
    fn default() -> Self {
        Self {
            command_timeout: default_command_timeout(),
            max_output_size: default_max_output_size(),
            max_concurrent_commands: default_max_concurrent_commands(),
            working_directory: None,
        }
    }
}

/// `[safety]` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SafetySection {
    #[serde(default = "default_require_confirmation")]
    pub require_confirmation: bool,

    /// Process/service names that may never be terminated (substring match,
    /// case-insensitive).
    #[serde(default = "default_protected_processes")]
    pub protected_processes: Vec<String>,

    /// Process ids that may never be terminated.
    #[serde(default = "default_protected_pids")]
    pub protected_pids: Vec<u32>,

    /// Command words/phrases that make a command line dangerous.
    #[serde(default = "default_dangerous_commands")]
    pub dangerous_commands: Vec<String>,
}

fn default_require_confirmation() -> bool {
    true
}

fn default_protected_processes() -> Vec<String> {
    ["systemd", "init", "sshd", "NetworkManager", "dbus-daemon"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_protected_pids() -> Vec<u32> {
    vec![1]
}

fn default_dangerous_commands() -> Vec<String> {
    [
        "rm",
        "kill",
        "killall",
        "pkill",
        "systemctl stop",
        "systemctl disable",
        "systemctl mask",
        "reboot",
        "shutdown",
        "poweroff",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for SafetySection {
    fn default() -> Self {
        Self {
            require_confirmation: default_require_confirmation(),
            protected_processes: default_protected_processes(),
            protected_pids: default_protected_pids(),
            dangerous_commands: default_dangerous_commands(),
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSection {
    /// Append one line per execution attempt to `history_file`.
    #[serde(default = "default_log_commands")]
    pub log_commands: bool,

    #[serde(default = "default_history_file")]
    pub history_file: PathBuf,
}

fn default_log_commands() -> bool {
    true
}

fn default_history_file() -> PathBuf {
    PathBuf::from("~/.cmdguard_history")
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            log_commands: default_log_commands(),
            history_file: default_history_file(),
        }
    }
}

/// Validated execution settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionSettings {
    pub command_timeout: Duration,
    pub max_output_size: usize,
    pub max_concurrent_commands: usize,
    pub working_directory: Option<PathBuf>,
}

/// Validated audit-log settings (`~` already expanded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub log_commands: bool,
    pub history_file: PathBuf,
}

/// Validated, immutable configuration shared by the executor and the safety
/// validator.
///
/// Only obtainable through `Settings::try_from(RawSettings)` (or the loader
/// helpers built on it), so a `Settings` value always carries a protection
/// policy that passed its invariant checks.
#[derive(Debug, Clone)]
pub struct Settings {
    execution: ExecutionSettings,
    policy: ProtectionPolicy,
    logging: LoggingSettings,
}

impl Settings {
    pub(crate) fn new_unchecked(
        execution: ExecutionSettings,
        policy: ProtectionPolicy,
        logging: LoggingSettings,
    ) -> Self {
        Self {
            execution,
            policy,
            logging,
        }
    }

    pub fn execution(&self) -> &ExecutionSettings {
        &self.execution
    }

    pub fn policy(&self) -> &ProtectionPolicy {
        &self.policy
    }

    pub fn logging(&self) -> &LoggingSettings {
        &self.logging
    }

    /// Convert back into the serialisable raw form.
    pub fn to_raw(&self) -> RawSettings {
        RawSettings {
            execution: ExecutionSection {
                command_timeout: self.execution.command_timeout.as_secs(),
                max_output_size: self.execution.max_output_size,
                max_concurrent_commands: self.execution.max_concurrent_commands,
                working_directory: self.execution.working_directory.clone(),
            },
            safety: SafetySection {
                require_confirmation: self.policy.require_confirmation(),
                protected_processes: self.policy.protected_names().to_vec(),
                protected_pids: self.policy.protected_pids().iter().copied().collect(),
                dangerous_commands: self
                    .policy
                    .dangerous_commands()
                    .map(|s| s.to_string())
                    .collect(),
            },
            logging: LoggingSection {
                log_commands: self.logging.log_commands,
                history_file: self.logging.history_file.clone(),
            },
        }
    }
}
