// src/config/validate.rs

use std::time::Duration;

use tracing::warn;

use crate::config::loader::expand_home;
use crate::config::model::{
    ExecutionSection, ExecutionSettings, LoggingSettings, RawSettings, SafetySection, Settings,
};
use crate::errors::{CmdguardError, Result};
use crate::safety::policy::{INIT_PID, REQUIRED_PROTECTED_NAMES};
use crate::safety::ProtectionPolicy;

impl TryFrom<RawSettings> for Settings {
    type Error = CmdguardError;

    fn try_from(raw: RawSettings) -> std::result::Result<Self, Self::Error> {
        validate_raw_settings(&raw)?;

        let RawSettings {
            execution,
            safety,
            logging,
        } = raw;

        let safety = normalize_safety(safety);
        let policy = ProtectionPolicy::new(
            safety.dangerous_commands,
            safety.protected_processes,
            safety.protected_pids,
            safety.require_confirmation,
        )?;

        let execution = ExecutionSettings {
            command_timeout: Duration::from_secs(execution.command_timeout),
            max_output_size: execution.max_output_size,
            max_concurrent_commands: execution.max_concurrent_commands,
            working_directory: execution.working_directory.map(|p| expand_home(&p)),
        };

        let logging = LoggingSettings {
            log_commands: logging.log_commands,
            history_file: expand_home(&logging.history_file),
        };

        Ok(Settings::new_unchecked(execution, policy, logging))
    }
}

/// Check the raw settings for values that can never work.
///
/// This does not touch the filesystem: a configured `working_directory`
/// that does not exist is reported per execution attempt instead.
pub fn validate_raw_settings(raw: &RawSettings) -> Result<()> {
    validate_execution(&raw.execution)?;
    validate_safety(&raw.safety)?;
    Ok(())
}

fn validate_execution(section: &ExecutionSection) -> Result<()> {
    if section.command_timeout == 0 {
        return Err(CmdguardError::Config(
            "[execution].command_timeout must be >= 1 second (got 0)".to_string(),
        ));
    }
    if section.max_output_size == 0 {
        return Err(CmdguardError::Config(
            "[execution].max_output_size must be >= 1 byte (got 0)".to_string(),
        ));
    }
    if section.max_concurrent_commands == 0 {
        return Err(CmdguardError::Config(
            "[execution].max_concurrent_commands must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_safety(section: &SafetySection) -> Result<()> {
    if let Some(pos) = section
        .dangerous_commands
        .iter()
        .position(|c| c.trim().is_empty())
    {
        return Err(CmdguardError::Config(format!(
            "[safety].dangerous_commands[{pos}] is empty"
        )));
    }
    if let Some(pos) = section
        .protected_processes
        .iter()
        .position(|p| p.trim().is_empty())
    {
        return Err(CmdguardError::Config(format!(
            "[safety].protected_processes[{pos}] is empty"
        )));
    }
    Ok(())
}

/// Make sure the init process is protected by PID and by name, whatever the
/// user file says.
pub fn normalize_safety(mut safety: SafetySection) -> SafetySection {
    if !safety.protected_pids.contains(&INIT_PID) {
        warn!(
            pid = INIT_PID,
            "protected_pids did not include the init process; adding it"
        );
        safety.protected_pids.insert(0, INIT_PID);
    }

    for required in REQUIRED_PROTECTED_NAMES {
        let present = safety
            .protected_processes
            .iter()
            .any(|p| p.trim().eq_ignore_ascii_case(required));
        if !present {
            warn!(
                name = %required,
                "protected_processes did not include a required name; adding it"
            );
            safety.protected_processes.push(required.to_string());
        }
    }

    safety
}
