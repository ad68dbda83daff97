// src/guard.rs

//! Sequencing of the safety check and the executor.
//!
//! The validator and the executor never call each other. Callers that want
//! the usual "assess, maybe ask, then run" flow use [`guarded_execute`].

use tracing::{info, warn};

use crate::exec::{ExecutionRequest, ExecutionResult, ExecutorBackend};
use crate::safety::{SafetyDecision, SafetyValidator};

/// What happened to a guarded request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardedOutcome {
    /// The command targets a protected process or service. Nothing ran.
    Blocked(SafetyDecision),
    /// Confirmation was required and the user said no. Nothing ran.
    Declined(SafetyDecision),
    /// The command was handed to the executor.
    Executed(ExecutionResult),
}

impl GuardedOutcome {
    pub fn result(&self) -> Option<&ExecutionResult> {
        match self {
            GuardedOutcome::Executed(result) => Some(result),
            _ => None,
        }
    }
}

/// Assess `request.command`, refuse it if blocked, ask `confirm` if the
/// policy wants confirmation, and run it otherwise.
///
/// Blocked commands are refused even for dry runs. Dry runs never prompt.
pub async fn guarded_execute<B, F>(
    validator: &SafetyValidator,
    backend: &B,
    request: ExecutionRequest,
    confirm: F,
) -> GuardedOutcome
where
    B: ExecutorBackend + ?Sized,
    F: FnOnce(&SafetyDecision) -> bool,
{
    let decision = validator.assess(&request.command);

    if decision.is_blocked() {
        warn!(
            command = %decision.command,
            reason = ?decision.reason,
            "blocked command targeting a protected process"
        );
        return GuardedOutcome::Blocked(decision);
    }

    if decision.requires_confirmation && !request.dry_run && !confirm(&decision) {
        info!(command = %decision.command, "user declined confirmation");
        return GuardedOutcome::Declined(decision);
    }

    GuardedOutcome::Executed(backend.execute(request).await)
}
