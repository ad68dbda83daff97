// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::env::apply_env_overrides;
use crate::config::model::{RawSettings, Settings};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw settings.
///
/// This only performs TOML deserialization; it does **not** validate or
/// normalise anything. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawSettings> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let raw: RawSettings = toml::from_str(&contents)?;

    Ok(raw)
}

/// Load a configuration file, apply `CMDGUARD_*` environment overrides and
/// validate the result.
///
/// This is the recommended entry point for the rest of the application.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Settings> {
    let mut raw = load_from_path(&path)?;
    apply_env_overrides(&mut raw, std::env::vars())?;
    let settings = Settings::try_from(raw)?;
    info!(path = %path.as_ref().display(), "loaded configuration");
    Ok(settings)
}

/// Load settings for the binary.
///
/// - An explicit path must exist.
/// - Without one, [`default_config_path`] is used if present, otherwise the
///   built-in defaults (still subject to environment overrides).
pub fn load_or_default(explicit: Option<&Path>) -> Result<Settings> {
    if let Some(path) = explicit {
        return load_and_validate(path);
    }

    match default_config_path() {
        Some(path) if path.is_file() => load_and_validate(&path),
        other => {
            debug!(candidate = ?other, "no config file found; using defaults");
            let mut raw = RawSettings::default();
            apply_env_overrides(&mut raw, std::env::vars())?;
            Settings::try_from(raw)
        }
    }
}

/// Default config location: `<config dir>/cmdguard/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("cmdguard").join("config.toml"))
}

impl Settings {
    /// Write these settings back to `path` as TOML, creating parent
    /// directories as needed.
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let contents = toml::to_string_pretty(&self.to_raw())?;
        fs::write(path, contents)?;
        info!(path = %path.display(), "saved configuration");
        Ok(())
    }
}

/// Expand a leading `~` component to the current user's home directory.
///
/// Paths without a leading `~` (or when no home directory is known) are
/// returned unchanged.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}
