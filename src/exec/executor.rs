// src/exec/executor.rs

//! The command executor.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::config::Settings;
use crate::exec::audit::AuditLog;
use crate::exec::output::{StreamCapture, cap_captured};
use crate::exec::process_group::{self, ProcessGroupGuard};
use crate::exec::request::ExecutionRequest;
use crate::exec::result::{ExecutionResult, ResultParts, TIMEOUT_EXIT_CODE};

/// How long to wait for already-buffered output after a timeout kill.
pub const FINAL_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// stderr reported when even the post-kill read does not finish.
pub const TIMEOUT_MESSAGE: &str = "Command timed out and was terminated";

/// Runs shell commands with a timeout, an output cap and an audit trail.
///
/// Cheap to clone; clones share the audit log and the concurrency permits.
/// Each `execute` call owns its child process and process group, so calls
/// may run concurrently.
#[derive(Debug, Clone)]
pub struct Executor {
    settings: Arc<Settings>,
    audit: Option<Arc<AuditLog>>,
    permits: Arc<Semaphore>,
}

/// Raw material collected from a finished (or killed) child.
struct Collected {
    status: Option<ExitStatus>,
    stdout: StreamCapture,
    stderr: StreamCapture,
    timed_out: bool,
}

/// Read buffer size for the output pipes.
const READ_CHUNK: usize = 8 * 1024;

impl Executor {
    pub fn new(settings: Arc<Settings>) -> Self {
        let audit = settings
            .logging()
            .log_commands
            .then(|| Arc::new(AuditLog::new(settings.logging().history_file.clone())));
        let permits = Arc::new(Semaphore::new(
            settings
                .execution()
                .max_concurrent_commands
                .min(Semaphore::MAX_PERMITS),
        ));
        Self {
            settings,
            audit,
            permits,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// History file in use, if command logging is enabled.
    pub fn audit_log_path(&self) -> Option<&Path> {
        self.audit.as_deref().map(AuditLog::path)
    }

    /// Run one command.
    ///
    /// Always returns a result: spawn/IO failures come back as
    /// `exit_code = 1` with the error text in stderr, timeouts as
    /// `timed_out = true`. Dropping the returned future kills the command's
    /// process group.
    pub async fn execute(&self, request: ExecutionRequest) -> ExecutionResult {
        let ExecutionRequest {
            command,
            timeout,
            working_directory,
            dry_run,
        } = request;
        let timeout = timeout.unwrap_or(self.settings.execution().command_timeout);

        let cwd = match self.resolve_working_directory(working_directory) {
            Ok(cwd) => cwd,
            Err(err) => {
                let result = ExecutionResult::failure(
                    command,
                    format!("Execution error: {err:#}"),
                    PathBuf::new(),
                    Duration::ZERO,
                );
                self.record(&result).await;
                return result;
            }
        };

        info!(command = %command, cwd = %cwd.display(), "executing command");

        if dry_run {
            info!(command = %command, "dry run; command not executed");
            return ExecutionResult::dry_run(command, cwd);
        }

        let started = Instant::now();

        if let Some(problem) = precheck(&command, timeout, &cwd) {
            warn!(command = %command, problem = %problem, "command rejected before spawning");
            let result = ExecutionResult::failure(
                command,
                format!("Execution error: {problem}"),
                cwd,
                started.elapsed(),
            );
            self.record(&result).await;
            return result;
        }

        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                let result = ExecutionResult::failure(
                    command,
                    "Execution error: executor is shut down",
                    cwd,
                    started.elapsed(),
                );
                self.record(&result).await;
                return result;
            }
        };

        let result = match self.run_process(&command, &cwd, timeout).await {
            Ok(result) => result,
            Err(err) => {
                error!(command = %command, error = %format!("{err:#}"), "command execution failed");
                ExecutionResult::failure(
                    command,
                    format!("Execution error: {err:#}"),
                    cwd,
                    started.elapsed(),
                )
            }
        };

        info!(
            command = %result.command(),
            exit_code = result.exit_code(),
            timed_out = result.timed_out(),
            truncated = result.truncated(),
            elapsed_ms = result.elapsed().as_millis() as u64,
            "command finished"
        );

        self.record(&result).await;
        result
    }

    /// Blocking variant of [`execute`](Self::execute) for callers without an
    /// async runtime.
    ///
    /// Drives the execution on a private current-thread runtime, so it must
    /// not be called from inside another Tokio runtime.
    pub fn execute_blocking(&self, request: ExecutionRequest) -> ExecutionResult {
        match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime.block_on(self.execute(request)),
            Err(err) => {
                error!(error = %err, "failed to start runtime for blocking execution");
                ExecutionResult::failure(
                    request.command,
                    format!("Execution error: {err}"),
                    request.working_directory.unwrap_or_default(),
                    Duration::ZERO,
                )
            }
        }
    }

    /// Request cwd, then configured default, then the process cwd.
    fn resolve_working_directory(&self, requested: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(dir) = requested.or_else(|| self.settings.execution().working_directory.clone())
        {
            return Ok(dir);
        }
        std::env::current_dir().context("determining current directory")
    }

    async fn run_process(
        &self,
        command: &str,
        cwd: &Path,
        timeout: Duration,
    ) -> Result<ExecutionResult> {
        let started = Instant::now();

        let mut cmd = shell_command(command);
        cmd.current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        process_group::isolate(&mut cmd);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawning shell in {}", cwd.display()))?;
        let pid = child.id();
        debug!(command = %command, pid = ?pid, "spawned child process");

        // Kills the group if this future is dropped before we are done.
        let mut group = ProcessGroupGuard::new(pid);

        // Each stream keeps at most the whole budget; the split happens later.
        let keep = self.settings.execution().max_output_size;
        let mut stdout_reader = tokio::spawn(read_stream(child.stdout.take(), keep));
        let mut stderr_reader = tokio::spawn(read_stream(child.stderr.take(), keep));

        let completed = tokio::time::timeout(timeout, async {
            let status = child.wait().await;
            let stdout = (&mut stdout_reader).await;
            let stderr = (&mut stderr_reader).await;
            (status, stdout, stderr)
        })
        .await;

        let collected = match completed {
            Ok((status, stdout, stderr)) => {
                group.disarm();
                let status = status.context("waiting for child process")?;
                Collected {
                    status: Some(status),
                    stdout: stdout.unwrap_or_default(),
                    stderr: stderr.unwrap_or_default(),
                    timed_out: false,
                }
            }
            Err(_) => {
                warn!(
                    command = %command,
                    timeout_secs = timeout.as_secs_f64(),
                    "command timed out; terminating process group"
                );
                group.terminate();
                if let Err(e) = child.start_kill() {
                    debug!(error = %e, "direct child already exited");
                }

                let final_read = tokio::time::timeout(FINAL_READ_TIMEOUT, async {
                    let status = child.wait().await.ok();
                    let stdout = (&mut stdout_reader).await;
                    let stderr = (&mut stderr_reader).await;
                    (status, stdout, stderr)
                })
                .await;

                match final_read {
                    Ok((status, stdout, stderr)) => Collected {
                        status,
                        stdout: stdout.unwrap_or_default(),
                        stderr: stderr.unwrap_or_default(),
                        timed_out: true,
                    },
                    Err(_) => {
                        debug!(command = %command, "output still open after kill; giving up on it");
                        stdout_reader.abort();
                        stderr_reader.abort();
                        Collected {
                            status: None,
                            stdout: StreamCapture::default(),
                            stderr: StreamCapture::complete(TIMEOUT_MESSAGE.as_bytes().to_vec()),
                            timed_out: true,
                        }
                    }
                }
            }
        };

        Ok(self.build_result(command, cwd, collected, started.elapsed()))
    }

    fn build_result(
        &self,
        command: &str,
        cwd: &Path,
        collected: Collected,
        elapsed: Duration,
    ) -> ExecutionResult {
        let max = self.settings.execution().max_output_size;
        let capped = cap_captured(&collected.stdout, &collected.stderr, max);
        if capped.truncated {
            warn!(
                command = %command,
                total = collected.stdout.total_len + collected.stderr.total_len,
                max,
                "output truncated"
            );
        }

        ExecutionResult::from_parts(ResultParts {
            command: command.to_string(),
            exit_code: exit_code(collected.status, collected.timed_out),
            stdout: capped.stdout,
            stderr: capped.stderr,
            elapsed,
            timed_out: collected.timed_out,
            truncated: capped.truncated,
            working_directory: cwd.to_path_buf(),
        })
    }

    async fn record(&self, result: &ExecutionResult) {
        if let Some(audit) = &self.audit {
            audit.record(result).await;
        }
    }
}

/// Reasons to refuse a request before spawning anything.
fn precheck(command: &str, timeout: Duration, cwd: &Path) -> Option<String> {
    if command.trim().is_empty() {
        return Some("empty command".to_string());
    }
    if timeout.is_zero() {
        return Some("timeout must be greater than zero".to_string());
    }
    if !cwd.is_dir() {
        return Some(format!(
            "working directory does not exist: {}",
            cwd.display()
        ));
    }
    None
}

/// Build a shell command appropriate for the platform.
fn shell_command(command: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(command);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(command);
        c
    }
}

/// Read a pipe to EOF, keeping the first `keep` bytes and counting the
/// rest. Read errors end the capture with what was read so far.
async fn read_stream<R>(stream: Option<R>, keep: usize) -> StreamCapture
where
    R: AsyncRead + Unpin,
{
    let mut capture = StreamCapture::default();
    let Some(mut stream) = stream else {
        return capture;
    };

    let mut chunk = vec![0u8; READ_CHUNK];
    loop {
        match stream.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                let room = keep.saturating_sub(capture.bytes.len());
                capture.bytes.extend_from_slice(&chunk[..n.min(room)]);
                capture.total_len += n;
            }
            Err(e) => {
                debug!(error = %e, read = capture.total_len, "output stream closed with error");
                break;
            }
        }
    }
    capture
}

/// Exit code for the result.
///
/// A timed-out command reports 124 unless the OS gave a non-zero code; the
/// shell may have exited 0 while a descendant kept the pipes open. Otherwise
/// a normal exit reports its code and a signal death follows the shell's
/// `128 + signal` convention.
fn exit_code(status: Option<ExitStatus>, timed_out: bool) -> i32 {
    let code = status.and_then(|s| s.code());
    if timed_out {
        return match code {
            Some(code) if code != 0 => code,
            _ => TIMEOUT_EXIT_CODE,
        };
    }
    match code {
        Some(code) => code,
        None => status.and_then(signal_exit_code).unwrap_or(-1),
    }
}

#[cfg(unix)]
fn signal_exit_code(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal().map(|sig| 128 + sig)
}

#[cfg(not(unix))]
fn signal_exit_code(_status: ExitStatus) -> Option<i32> {
    None
}
