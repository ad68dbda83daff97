// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The guarded entry point talks to an `ExecutorBackend` instead of a
//! concrete [`Executor`]. Production code passes the real executor; tests
//! can pass a fake that records requests and returns canned results without
//! spawning anything.

use std::future::Future;
use std::pin::Pin;

use super::executor::Executor;
use super::request::ExecutionRequest;
use super::result::ExecutionResult;

/// Trait abstracting how an approved command is run.
pub trait ExecutorBackend: Send + Sync {
    fn execute(
        &self,
        request: ExecutionRequest,
    ) -> Pin<Box<dyn Future<Output = ExecutionResult> + Send + '_>>;
}

impl ExecutorBackend for Executor {
    fn execute(
        &self,
        request: ExecutionRequest,
    ) -> Pin<Box<dyn Future<Output = ExecutionResult> + Send + '_>> {
        Box::pin(Executor::execute(self, request))
    }
}
