// src/exec/audit.rs

//! Append-only command history.
//!
//! One line per execution attempt:
//!
//! ```text
//! 2026-10-18T09:15:02.123456 | SUCCESS | ls -la
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::exec::ExecutionResult;

/// History file shared by all executions of one executor.
///
/// Writes are serialised through a mutex and each line goes out in a single
/// append, so concurrent executions never interleave within a line. Lines
/// appear in completion order.
#[derive(Debug)]
pub struct AuditLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record one attempt. Failures are logged and swallowed.
    pub async fn record(&self, result: &ExecutionResult) {
        let line = format_line(Local::now(), result.succeeded(), result.command());
        if let Err(err) = self.append(&line).await {
            warn!(
                path = %self.path.display(),
                error = %format!("{err:#}"),
                "failed to write command history"
            );
        }
    }

    async fn append(&self, line: &str) -> Result<()> {
        let _guard = self.lock.lock().await;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("opening {}", self.path.display()))?;
        file.write_all(line.as_bytes())
            .await
            .with_context(|| format!("appending to {}", self.path.display()))?;
        file.flush().await?;

        debug!(path = %self.path.display(), "recorded command history line");
        Ok(())
    }
}

/// `<ISO-8601 timestamp> | SUCCESS|FAILED | <command>\n`
///
/// Newlines inside the command are escaped so every attempt stays on one
/// line.
pub fn format_line(timestamp: DateTime<Local>, succeeded: bool, command: &str) -> String {
    let status = if succeeded { "SUCCESS" } else { "FAILED" };
    let command = command.replace('\r', "\\r").replace('\n', "\\n");
    format!(
        "{} | {} | {}\n",
        timestamp.format("%Y-%m-%dT%H:%M:%S%.6f"),
        status,
        command
    )
}
