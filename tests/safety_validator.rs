// tests/safety_validator.rs

use std::sync::Arc;

use cmdguard::config::Settings;
use cmdguard::process_table::mock::MockProcessTable;
use cmdguard::safety::{KillTarget, ProtectionPolicy, SafetyValidator};
use cmdguard_test_utils::builders::SettingsBuilder;
use cmdguard_test_utils::fake_process_table;

fn validator_with(settings: Arc<Settings>) -> SafetyValidator {
    SafetyValidator::with_process_table(settings, Arc::new(fake_process_table())).unwrap()
}

fn validator() -> SafetyValidator {
    validator_with(SettingsBuilder::new().build())
}

// --- is_dangerous ---

#[test]
fn dangerous_commands_match_whole_words() {
    let v = validator();

    assert!(v.is_dangerous("rm -rf /"));
    assert!(v.is_dangerous("RM -rf /tmp/x"));
    assert!(v.is_dangerous("cd /tmp && rm foo"));
    assert!(!v.is_dangerous("ls -la"));
    assert!(!v.is_dangerous("echo form"));
    assert!(!v.is_dangerous("cat firmware.bin"));
}

#[test]
fn systemctl_actions_are_distinguished() {
    let v = validator();

    assert!(!v.is_dangerous("systemctl status nginx"));
    assert!(v.is_dangerous("systemctl stop nginx"));
    assert!(v.is_dangerous("systemctl   STOP nginx"));
    assert!(v.is_dangerous("sudo systemctl mask sshd"));
}

#[test]
fn custom_dangerous_list_replaces_the_default() {
    let v = validator_with(SettingsBuilder::new().dangerous_commands(&["dd", "mkfs"]).build());

    assert!(v.is_dangerous("dd if=/dev/zero of=/dev/sda"));
    assert!(!v.is_dangerous("rm -rf /"));
}

// --- is_protected ---

#[test]
fn pid_one_is_protected() {
    let check = validator().is_protected("1");

    assert!(check.is_protected);
    assert!(check.reason.unwrap().contains("PID 1"));
}

#[test]
fn nonexistent_pid_is_not_protected() {
    let check = validator().is_protected("99999999");

    assert!(!check.is_protected);
    assert!(check.reason.is_none());
}

#[test]
fn protected_names_match_case_insensitive_substrings() {
    let v = validator();

    let check = v.is_protected("systemd");
    assert!(check.is_protected);
    assert!(check.reason.unwrap().contains("systemd"));

    assert!(v.is_protected("systemd-journald").is_protected);
    assert!(v.is_protected("SSHD").is_protected);
    assert!(!v.is_protected("nginx").is_protected);
}

#[test]
fn pid_resolves_to_process_name() {
    let v = validator();

    let sshd = v.is_protected("612");
    assert!(sshd.is_protected);
    assert!(sshd.reason.unwrap().contains("sshd"));

    assert!(!v.is_protected("4242").is_protected);
}

#[test]
fn configured_pids_are_protected_without_lookup() {
    let v = validator_with(SettingsBuilder::new().protect_pid(4242).build());

    let check = v.is_protected("4242");
    assert!(check.is_protected);
    assert!(check.reason.unwrap().contains("PID 4242"));
}

#[test]
fn negative_identifiers() {
    let v = validator();

    // Signals every process the caller can reach.
    assert!(v.is_protected("-1").is_protected);
    // Process group 612 is led by sshd.
    assert!(v.is_protected("-612").is_protected);
    assert!(!v.is_protected("-4242").is_protected);
}

// --- validate_kill ---

#[test]
fn killing_a_protected_pid_is_refused() {
    let result = validator().validate_kill("kill -9 1");

    assert!(!result.is_safe);
    assert!(result.error.unwrap().contains("PID 1"));
    assert_eq!(result.protected.unwrap().identifier, "1");
}

#[test]
fn killing_a_regular_process_is_safe_and_enriched() {
    let result = validator().validate_kill("kill -9 4242");

    assert!(result.is_safe);
    assert!(result.error.is_none());
    match result.target {
        Some(KillTarget::Process(record)) => {
            assert_eq!(record.pid, 4242);
            assert_eq!(record.name, "nginx");
        }
        other => panic!("expected a process target, got {other:?}"),
    }
}

#[test]
fn killall_collects_every_match() {
    let result = validator().validate_kill("killall nginx");

    assert!(result.is_safe);
    match result.target {
        Some(KillTarget::Matches(records)) => {
            let pids: Vec<u32> = records.iter().map(|r| r.pid).collect();
            assert_eq!(pids, vec![4242, 4243]);
        }
        other => panic!("expected matches, got {other:?}"),
    }
}

#[test]
fn no_matches_is_still_safe() {
    let result = validator().validate_kill("pkill ghost-worker");

    assert!(result.is_safe);
    assert!(result.target.is_none());
}

#[test]
fn pkill_of_protected_name_is_refused() {
    let result = validator().validate_kill("pkill -f sshd");

    assert!(!result.is_safe);
    assert!(result.error.unwrap().contains("sshd"));
}

#[test]
fn program_path_is_recognised() {
    assert!(!validator().validate_kill("/bin/kill 1").is_safe);
}

#[test]
fn malformed_kill_commands() {
    let v = validator();

    assert_eq!(v.validate_kill("").error.as_deref(), Some("Empty command"));
    assert_eq!(
        v.validate_kill("kill").error.as_deref(),
        Some("No target specified for kill")
    );
    assert_eq!(
        v.validate_kill("systemctl stop").error.as_deref(),
        Some("Incomplete systemctl command")
    );
}

#[test]
fn last_token_is_taken_as_the_target() {
    // Known limitation: a flag after the real target hides it.
    let result = validator().validate_kill("kill 1 --verbose");

    assert!(result.is_safe);
}

#[test]
fn stopping_a_protected_service_is_refused() {
    let v = validator();

    let result = v.validate_kill("systemctl stop sshd.service");
    assert!(!result.is_safe);
    assert_eq!(result.protected.unwrap().identifier, "sshd.service");

    assert!(!v.validate_kill("systemctl mask dbus-daemon.socket").is_safe);
    assert!(!v.validate_kill("systemctl disable systemd-networkd").is_safe);
}

#[test]
fn stopping_a_regular_service_is_safe() {
    let result = validator().validate_kill("systemctl stop nginx.service");

    assert!(result.is_safe);
    assert_eq!(
        result.target,
        Some(KillTarget::Service {
            service: "nginx.service".to_string(),
            action: "stop".to_string(),
        })
    );
}

#[test]
fn other_commands_pass_through() {
    let v = validator();

    let restart = v.validate_kill("systemctl restart sshd");
    assert!(restart.is_safe);
    assert!(restart.target.is_none());

    assert!(v.validate_kill("ls -la").is_safe);
}

// --- requires_confirmation ---

#[test]
fn safe_commands_need_no_confirmation() {
    let c = validator().requires_confirmation("ls -la");

    assert!(!c.required);
    assert!(c.reason.is_none());
}

#[test]
fn destructive_commands_need_confirmation() {
    let c = validator().requires_confirmation("rm -rf build/");

    assert!(c.required);
    assert_eq!(c.reason.as_deref(), Some("This is a potentially destructive command"));
}

#[test]
fn kill_confirmation_describes_the_target() {
    let v = validator();

    assert_eq!(
        v.requires_confirmation("kill 4242").reason.as_deref(),
        Some("This command will terminate processes (nginx, PID 4242)")
    );
    assert_eq!(
        v.requires_confirmation("killall nginx").reason.as_deref(),
        Some("This command will terminate processes (2 matching processes)")
    );
    assert_eq!(
        v.requires_confirmation("systemctl stop nginx").reason.as_deref(),
        Some("This command will terminate processes (service: nginx)")
    );
    assert_eq!(
        v.requires_confirmation("kill 31337").reason.as_deref(),
        Some("This command will terminate processes")
    );
}

#[test]
fn unsafe_kill_surfaces_the_block_reason() {
    let c = validator().requires_confirmation("kill 1");

    assert!(c.required);
    assert!(c.reason.unwrap().contains("PID 1"));
}

#[test]
fn disabled_confirmation_short_circuits() {
    let v = validator_with(SettingsBuilder::new().require_confirmation(false).build());

    assert!(!v.requires_confirmation("rm -rf /").required);
    assert!(!v.requires_confirmation("kill 1").required);
}

// --- assess ---

#[test]
fn assess_reports_hard_blocks() {
    let decision = validator().assess("kill -9 1");

    assert!(decision.is_dangerous);
    assert!(decision.requires_confirmation);
    assert!(decision.is_blocked());
    assert_eq!(decision.protected_target.unwrap().identifier, "1");
}

#[test]
fn assess_blocks_even_without_confirmation() {
    let v = validator_with(SettingsBuilder::new().require_confirmation(false).build());
    let decision = v.assess("systemctl stop sshd");

    assert!(!decision.requires_confirmation);
    assert!(decision.is_blocked());
    assert!(decision.reason.unwrap().contains("sshd"));
}

#[test]
fn assess_of_a_plain_command() {
    let decision = validator().assess("echo hello");

    assert!(!decision.is_dangerous);
    assert!(!decision.requires_confirmation);
    assert!(!decision.is_blocked());
    assert!(decision.reason.is_none());
}

#[test]
fn verdicts_are_repeatable() {
    let v = validator();
    for command in ["kill 1", "killall nginx", "rm -rf /", "ls", "systemctl stop sshd"] {
        assert_eq!(v.assess(command), v.assess(command));
        assert_eq!(v.validate_kill(command), v.validate_kill(command));
    }
}

#[test]
fn table_changes_are_seen_on_the_next_call() {
    let table = MockProcessTable::new();
    let v = SafetyValidator::with_process_table(
        SettingsBuilder::new().build(),
        Arc::new(table.clone()),
    )
    .unwrap();

    assert!(!v.is_protected("700").is_protected);
    table.add_process(700, "sshd", "sshd: user@pts/0");
    assert!(v.is_protected("700").is_protected);
}

// --- policy invariants ---

#[test]
fn policy_without_init_pid_is_refused() {
    let err = ProtectionPolicy::new(
        vec!["rm".to_string()],
        vec!["systemd".to_string(), "init".to_string()],
        [2],
        true,
    )
    .unwrap_err();

    assert!(err.to_string().contains("PID 1"));
}

#[test]
fn policy_without_init_names_is_refused() {
    let err = ProtectionPolicy::new(vec![], vec!["sshd".to_string()], [1], true).unwrap_err();

    assert!(err.to_string().contains("systemd"));
}
