// src/config/env.rs

//! Environment variable overrides.
//!
//! Any variable named `CMDGUARD_<SECTION>__<FIELD>` overrides the matching
//! field of [`RawSettings`] after the file has been read, e.g.
//!
//! ```text
//! CMDGUARD_EXECUTION__COMMAND_TIMEOUT=5
//! CMDGUARD_SAFETY__PROTECTED_PIDS=1,2
//! CMDGUARD_LOGGING__LOG_COMMANDS=false
//! ```
//!
//! Names are case-insensitive. List fields take comma-separated values.
//! Variables without the `__` separator (such as `CMDGUARD_LOG`) are not
//! configuration overrides and are skipped.

use std::path::PathBuf;
use std::str::FromStr;

use tracing::{debug, info};

use crate::config::model::RawSettings;
use crate::errors::{CmdguardError, Result};

pub const ENV_PREFIX: &str = "CMDGUARD_";

/// Apply every recognised override from `vars` to `raw`.
///
/// Takes the variables as an iterator so callers (and tests) decide where
/// they come from; production passes `std::env::vars()`.
pub fn apply_env_overrides<I, K, V>(raw: &mut RawSettings, vars: I) -> Result<()>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    for (key, value) in vars {
        let key = key.as_ref();
        let value = value.as_ref();

        let upper = key.to_ascii_uppercase();
        let Some(rest) = upper.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        let Some((section, field)) = rest.split_once("__") else {
            continue;
        };

        apply_one(
            raw,
            &section.to_ascii_lowercase(),
            &field.to_ascii_lowercase(),
            key,
            value,
        )?;
    }
    Ok(())
}

fn apply_one(
    raw: &mut RawSettings,
    section: &str,
    field: &str,
    key: &str,
    value: &str,
) -> Result<()> {
    match (section, field) {
        ("execution", "command_timeout") => {
            raw.execution.command_timeout = parse_scalar(key, value)?;
        }
        ("execution", "max_output_size") => {
            raw.execution.max_output_size = parse_scalar(key, value)?;
        }
        ("execution", "max_concurrent_commands") => {
            raw.execution.max_concurrent_commands = parse_scalar(key, value)?;
        }
        ("execution", "working_directory") => {
            let trimmed = value.trim();
            raw.execution.working_directory =
                (!trimmed.is_empty()).then(|| PathBuf::from(trimmed));
        }
        ("safety", "require_confirmation") => {
            raw.safety.require_confirmation = parse_bool(key, value)?;
        }
        ("safety", "protected_processes") => {
            raw.safety.protected_processes = parse_list(value);
        }
        ("safety", "protected_pids") => {
            raw.safety.protected_pids = parse_list(value)
                .iter()
                .map(|item| parse_scalar(key, item))
                .collect::<Result<Vec<u32>>>()?;
        }
        ("safety", "dangerous_commands") => {
            raw.safety.dangerous_commands = parse_list(value);
        }
        ("logging", "log_commands") => {
            raw.logging.log_commands = parse_bool(key, value)?;
        }
        ("logging", "history_file") => {
            raw.logging.history_file = PathBuf::from(value.trim());
        }
        _ => {
            debug!(variable = %key, "ignoring unrecognised CMDGUARD_ override");
            return Ok(());
        }
    }

    info!(variable = %key, "applied configuration override from environment");
    Ok(())
}

fn parse_scalar<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        CmdguardError::Config(format!("{key}: invalid value '{value}'"))
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(CmdguardError::Config(format!(
            "{key}: invalid boolean '{value}' (expected true/false)"
        ))),
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
