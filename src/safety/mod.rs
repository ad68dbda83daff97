// src/safety/mod.rs

//! Safety validation for commands before they are executed.
//!
//! - [`policy`] holds the read-only [`ProtectionPolicy`].
//! - [`validator`] implements [`SafetyValidator`], which classifies command
//!   strings, resolves protected targets and decides whether a command needs
//!   explicit confirmation.
//!
//! Every operation here returns a plain value describing its verdict.
//! A protected target is a negative verdict with a reason, never an error.

pub mod policy;
pub mod validator;

pub use policy::ProtectionPolicy;
pub use validator::SafetyValidator;

use crate::process_table::ProcessRecord;

/// Outcome of checking whether a PID or name is protected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectionCheck {
    pub is_protected: bool,
    pub reason: Option<String>,
}

impl ProtectionCheck {
    pub fn protected(reason: String) -> Self {
        Self {
            is_protected: true,
            reason: Some(reason),
        }
    }

    pub fn unprotected() -> Self {
        Self {
            is_protected: false,
            reason: None,
        }
    }
}

/// Identifies the process or service that caused a kill/stop to be refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedTargetInfo {
    /// The target exactly as it appeared in the command (PID or name).
    pub identifier: String,
    pub reason: String,
}

/// What a kill/stop command is aimed at, gathered for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KillTarget {
    /// A numeric target that resolved to a running process.
    Process(ProcessRecord),
    /// A name target and the running processes it matches.
    Matches(Vec<ProcessRecord>),
    /// A `systemctl stop|disable|mask <service>` target.
    Service { service: String, action: String },
}

/// Result of [`SafetyValidator::validate_kill`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KillValidation {
    pub is_safe: bool,
    pub error: Option<String>,
    pub target: Option<KillTarget>,
    /// Set when the command was refused because its target is protected.
    pub protected: Option<ProtectedTargetInfo>,
}

impl KillValidation {
    pub(crate) fn safe(target: Option<KillTarget>) -> Self {
        Self {
            is_safe: true,
            error: None,
            target,
            protected: None,
        }
    }

    pub(crate) fn malformed(error: impl Into<String>) -> Self {
        Self {
            is_safe: false,
            error: Some(error.into()),
            target: None,
            protected: None,
        }
    }

    pub(crate) fn refused(identifier: &str, reason: String) -> Self {
        Self {
            is_safe: false,
            error: Some(reason.clone()),
            target: None,
            protected: Some(ProtectedTargetInfo {
                identifier: identifier.to_string(),
                reason,
            }),
        }
    }
}

/// Result of [`SafetyValidator::requires_confirmation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub required: bool,
    pub reason: Option<String>,
}

impl Confirmation {
    pub fn not_required() -> Self {
        Self {
            required: false,
            reason: None,
        }
    }

    pub fn required(reason: impl Into<String>) -> Self {
        Self {
            required: true,
            reason: Some(reason.into()),
        }
    }
}

/// Combined verdict for one command string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyDecision {
    pub command: String,
    pub is_dangerous: bool,
    pub requires_confirmation: bool,
    pub reason: Option<String>,
    pub protected_target: Option<ProtectedTargetInfo>,
}

impl SafetyDecision {
    /// True when the command targets a protected process or service and
    /// must not run, whatever the user answers.
    pub fn is_blocked(&self) -> bool {
        self.protected_target.is_some()
    }
}
