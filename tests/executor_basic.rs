// tests/executor_basic.rs
#![cfg(unix)]

use std::time::Duration;

use cmdguard::exec::{DRY_RUN_STDOUT, ExecutionRequest, Executor};
use cmdguard_test_utils::builders::SettingsBuilder;
use cmdguard_test_utils::init_tracing;
use tempfile::tempdir;

fn executor() -> Executor {
    Executor::new(SettingsBuilder::new().command_timeout(10).build())
}

#[tokio::test]
async fn echo_captures_stdout_and_succeeds() {
    init_tracing();
    let result = executor().execute(ExecutionRequest::new("echo hello")).await;

    assert_eq!(result.exit_code(), 0);
    assert!(result.succeeded());
    assert!(result.stdout().contains("hello"));
    assert!(result.stderr().is_empty());
    assert!(!result.timed_out());
    assert!(!result.truncated());
    assert!(result.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn false_reports_nonzero_exit() {
    init_tracing();
    let result = executor().execute(ExecutionRequest::new("false")).await;

    assert_ne!(result.exit_code(), 0);
    assert!(!result.succeeded());
    assert!(!result.timed_out());
}

#[tokio::test]
async fn exit_code_is_passed_through() {
    let result = executor()
        .execute(ExecutionRequest::new("echo oops >&2; exit 3"))
        .await;

    assert_eq!(result.exit_code(), 3);
    assert_eq!(result.stderr().trim(), "oops");
    assert_eq!(result.combined_output().trim(), "oops");
}

#[tokio::test]
async fn shell_syntax_is_interpreted() {
    let result = executor()
        .execute(ExecutionRequest::new("printf 'a\\nb\\nc\\n' | grep -c ."))
        .await;

    assert_eq!(result.exit_code(), 0);
    assert_eq!(result.stdout().trim(), "3");
}

#[tokio::test]
async fn runs_in_requested_working_directory() {
    let dir = tempdir().unwrap();
    let canonical = dir.path().canonicalize().unwrap();

    let result = executor()
        .execute(ExecutionRequest::new("pwd -P").working_directory(&canonical))
        .await;

    assert!(result.succeeded(), "stderr: {}", result.stderr());
    assert_eq!(result.stdout().trim(), canonical.to_str().unwrap());
    assert_eq!(result.working_directory(), canonical.as_path());
}

#[tokio::test]
async fn configured_working_directory_is_the_default() {
    let dir = tempdir().unwrap();
    let canonical = dir.path().canonicalize().unwrap();
    let settings = SettingsBuilder::new().working_directory(&canonical).build();

    let result = Executor::new(settings)
        .execute(ExecutionRequest::new("pwd -P"))
        .await;

    assert_eq!(result.stdout().trim(), canonical.to_str().unwrap());
}

#[tokio::test]
async fn missing_working_directory_fails_without_spawning() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");
    let marker = dir.path().join("ran");

    let result = executor()
        .execute(
            ExecutionRequest::new(format!("touch {}", marker.display()))
                .working_directory(&missing),
        )
        .await;

    assert_eq!(result.exit_code(), 1);
    assert!(!result.succeeded());
    assert!(result.stderr().contains("working directory does not exist"));
    assert!(!marker.exists());
}

#[tokio::test]
async fn empty_command_is_rejected() {
    let result = executor().execute(ExecutionRequest::new("   ")).await;

    assert_eq!(result.exit_code(), 1);
    assert!(result.stderr().contains("empty command"));
}

#[tokio::test]
async fn zero_timeout_is_rejected() {
    let result = executor()
        .execute(ExecutionRequest::new("echo hi").timeout(Duration::ZERO))
        .await;

    assert_eq!(result.exit_code(), 1);
    assert!(result.stderr().contains("timeout"));
    assert!(result.stdout().is_empty());
}

#[tokio::test]
async fn dry_run_never_spawns() {
    let dir = tempdir().unwrap();
    let marker = dir.path().join("ran");

    let result = executor()
        .execute(
            ExecutionRequest::new(format!("touch {}", marker.display()))
                .working_directory(dir.path())
                .dry_run(true),
        )
        .await;

    assert_eq!(result.exit_code(), 0);
    assert!(result.succeeded());
    assert_eq!(result.stdout(), DRY_RUN_STDOUT);
    assert_eq!(result.elapsed(), Duration::ZERO);
    assert_eq!(result.working_directory(), dir.path());
    assert!(!marker.exists());
}

#[tokio::test]
async fn invalid_utf8_is_replaced_not_fatal() {
    let result = executor()
        .execute(ExecutionRequest::new("printf 'ok\\377\\376end'"))
        .await;

    assert_eq!(result.exit_code(), 0);
    assert!(result.stdout().starts_with("ok"));
    assert!(result.stdout().ends_with("end"));
    assert!(result.stdout().contains('\u{FFFD}'));
}

#[tokio::test]
async fn concurrent_executions_are_independent() {
    let executor = executor();
    let a = executor.execute(ExecutionRequest::new("sleep 0.2; echo a"));
    let b = executor.execute(ExecutionRequest::new("echo b; exit 2"));

    let (a, b) = tokio::join!(a, b);

    assert_eq!(a.stdout().trim(), "a");
    assert_eq!(a.exit_code(), 0);
    assert_eq!(b.stdout().trim(), "b");
    assert_eq!(b.exit_code(), 2);
}

#[test]
fn blocking_variant_runs_outside_a_runtime() {
    let result = executor().execute_blocking(ExecutionRequest::new("echo blocking"));

    assert!(result.succeeded());
    assert_eq!(result.stdout().trim(), "blocking");
}
