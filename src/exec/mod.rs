// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running shell commands, using
//! `tokio::process::Command`, and turning whatever happened into an
//! [`ExecutionResult`].
//!
//! - [`request`] defines the [`ExecutionRequest`] handed in by callers.
//! - [`result`] defines the immutable [`ExecutionResult`].
//! - [`executor`] owns the spawn / timeout / capture logic.
//! - [`process_group`] isolates each command in its own process group and
//!   kills that group on timeout or cancellation.
//! - [`output`] decodes and proportionally truncates captured output.
//! - [`audit`] appends one line per execution to the history file.
//! - [`backend`] provides the `ExecutorBackend` trait so tests can replace
//!   the real executor with a fake implementation.

pub mod audit;
pub mod backend;
pub mod executor;
pub mod output;
pub mod process_group;
pub mod request;
pub mod result;

pub use audit::AuditLog;
pub use backend::ExecutorBackend;
pub use executor::{Executor, FINAL_READ_TIMEOUT, TIMEOUT_MESSAGE};
pub use output::{StreamCapture, TRUNCATION_MARKER, cap_captured, cap_output, split_limits};
pub use request::ExecutionRequest;
pub use result::{DRY_RUN_STDOUT, ExecutionResult, FAILURE_EXIT_CODE, TIMEOUT_EXIT_CODE};
