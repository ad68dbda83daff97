// tests/config_loading.rs

use std::io::Write;
use std::time::Duration;

use cmdguard::config::env::apply_env_overrides;
use cmdguard::config::{RawSettings, Settings, load_and_validate, load_from_path, load_or_default};
use cmdguard::errors::CmdguardError;
use tempfile::{NamedTempFile, tempdir};

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn defaults_when_sections_are_missing() {
    let file = write_config("");
    let settings = load_and_validate(file.path()).unwrap();

    assert_eq!(settings.execution().command_timeout, Duration::from_secs(30));
    assert_eq!(settings.execution().max_output_size, 10 * 1024 * 1024);
    assert_eq!(settings.execution().max_concurrent_commands, 3);
    assert!(settings.execution().working_directory.is_none());
    assert!(settings.policy().require_confirmation());
    assert!(settings.policy().is_protected_pid(1));
    assert!(settings.logging().log_commands);
    assert!(settings.logging().history_file.ends_with(".cmdguard_history"));
}

#[test]
fn values_are_read_from_toml() {
    let file = write_config(
        r#"
[execution]
command_timeout = 5
max_output_size = 2048
working_directory = "/srv"

[safety]
require_confirmation = false
protected_processes = ["systemd", "init", "postgres"]
protected_pids = [1, 42]
dangerous_commands = ["rm", "dd"]

[logging]
log_commands = false
history_file = "/var/log/cmdguard.history"
"#,
    );
    let settings = load_and_validate(file.path()).unwrap();

    assert_eq!(settings.execution().command_timeout, Duration::from_secs(5));
    assert_eq!(settings.execution().max_output_size, 2048);
    assert_eq!(
        settings.execution().working_directory.as_deref(),
        Some(std::path::Path::new("/srv"))
    );
    assert!(!settings.policy().require_confirmation());
    assert!(settings.policy().is_protected_pid(42));
    assert_eq!(settings.policy().matching_protected_name("postgres: writer"), Some("postgres"));
    assert_eq!(settings.policy().dangerous_commands().collect::<Vec<_>>(), vec!["rm", "dd"]);
    assert!(!settings.logging().log_commands);
}

#[test]
fn init_process_is_always_protected() {
    let file = write_config(
        r#"
[safety]
protected_processes = ["sshd"]
protected_pids = [500]
"#,
    );
    let settings = load_and_validate(file.path()).unwrap();
    let policy = settings.policy();

    assert!(policy.is_protected_pid(1));
    assert!(policy.is_protected_pid(500));
    assert!(policy.matching_protected_name("systemd").is_some());
    assert!(policy.matching_protected_name("init").is_some());
    assert!(policy.matching_protected_name("sshd").is_some());
}

#[test]
fn zero_timeout_is_a_config_error() {
    let file = write_config("[execution]\ncommand_timeout = 0\n");

    match load_and_validate(file.path()) {
        Err(CmdguardError::Config(msg)) => assert!(msg.contains("command_timeout")),
        other => panic!("expected Config error, got {other:?}"),
    }
}

#[test]
fn zero_concurrency_is_a_config_error() {
    let file = write_config("[execution]\nmax_concurrent_commands = 0\n");

    assert!(matches!(
        load_and_validate(file.path()),
        Err(CmdguardError::Config(_))
    ));
}

#[test]
fn empty_dangerous_entry_is_a_config_error() {
    let file = write_config("[safety]\ndangerous_commands = [\"rm\", \"  \"]\n");

    match load_and_validate(file.path()) {
        Err(CmdguardError::Config(msg)) => assert!(msg.contains("dangerous_commands[1]")),
        other => panic!("expected Config error, got {other:?}"),
    }
}

#[test]
fn malformed_toml_is_reported() {
    let file = write_config("[execution\ncommand_timeout = ");

    assert!(matches!(
        load_from_path(file.path()),
        Err(CmdguardError::TomlDe(_))
    ));
}

#[test]
fn explicit_missing_path_is_an_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.toml");

    assert!(matches!(
        load_or_default(Some(missing.as_path())),
        Err(CmdguardError::Io(_))
    ));
}

#[test]
fn env_overrides_apply_on_top_of_the_file() {
    let mut raw = RawSettings::default();
    apply_env_overrides(
        &mut raw,
        [
            ("CMDGUARD_EXECUTION__COMMAND_TIMEOUT", "7"),
            ("cmdguard_safety__protected_pids", "1, 99"),
            ("CMDGUARD_SAFETY__DANGEROUS_COMMANDS", "rm,shred"),
            ("CMDGUARD_LOGGING__LOG_COMMANDS", "off"),
            ("CMDGUARD_LOG", "debug"),
            ("CMDGUARD_EXECUTION__UNKNOWN_FIELD", "whatever"),
            ("PATH", "/usr/bin"),
        ],
    )
    .unwrap();

    assert_eq!(raw.execution.command_timeout, 7);
    assert_eq!(raw.safety.protected_pids, vec![1, 99]);
    assert_eq!(raw.safety.dangerous_commands, vec!["rm", "shred"]);
    assert!(!raw.logging.log_commands);
}

#[test]
fn unparseable_env_override_is_an_error() {
    let mut raw = RawSettings::default();
    let err = apply_env_overrides(
        &mut raw,
        [("CMDGUARD_EXECUTION__MAX_OUTPUT_SIZE", "lots")],
    )
    .unwrap_err();

    assert!(err.to_string().contains("CMDGUARD_EXECUTION__MAX_OUTPUT_SIZE"));
}

#[test]
fn saved_settings_load_back_identically() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("conf").join("config.toml");

    let mut raw = RawSettings::default();
    raw.execution.command_timeout = 12;
    raw.safety.protected_processes.push("postgres".to_string());
    raw.logging.history_file = dir.path().join("history");
    let settings = Settings::try_from(raw).unwrap();

    settings.save_to_path(&path).unwrap();
    let reloaded = load_and_validate(&path).unwrap();

    assert_eq!(reloaded.execution(), settings.execution());
    assert_eq!(reloaded.logging(), settings.logging());
    assert_eq!(
        reloaded.policy().protected_names(),
        settings.policy().protected_names()
    );
}

#[test]
fn tilde_expands_to_home() {
    let mut raw = RawSettings::default();
    raw.logging.history_file = "~/hist".into();
    let settings = Settings::try_from(raw).unwrap();

    if let Some(home) = dirs::home_dir() {
        assert_eq!(settings.logging().history_file, home.join("hist"));
    }
}
