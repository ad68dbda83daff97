// src/safety/policy.rs

//! The protection policy: which commands are dangerous and which processes
//! may never be terminated.

use std::collections::BTreeSet;

use regex::{Regex, RegexBuilder};

use crate::errors::{CmdguardError, Result};

/// PID of the init / service-manager process.
pub const INIT_PID: u32 = 1;

/// Names that must always be in the protected set.
pub const REQUIRED_PROTECTED_NAMES: &[&str] = &["systemd", "init"];

/// One entry of the dangerous-command list with its compiled matcher.
#[derive(Debug, Clone)]
struct DangerousPattern {
    text: String,
    matcher: Regex,
}

impl DangerousPattern {
    /// Whole-word, case-insensitive match. Spaces inside a phrase such as
    /// `systemctl stop` match any run of whitespace.
    fn compile(text: &str) -> Result<Self> {
        let body = text
            .split_whitespace()
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(r"\s+");
        let matcher = RegexBuilder::new(&format!(r"\b{body}\b"))
            .case_insensitive(true)
            .build()
            .map_err(|e| {
                CmdguardError::Policy(format!("invalid dangerous command '{text}': {e}"))
            })?;
        Ok(Self {
            text: text.to_string(),
            matcher,
        })
    }
}

/// Read-only protection policy.
///
/// Built once at startup and shared by reference; there is no way to mutate
/// it afterwards. Construction fails if the init process is not protected
/// by PID and by name.
#[derive(Debug, Clone)]
pub struct ProtectionPolicy {
    dangerous: Vec<DangerousPattern>,
    protected_names: Vec<String>,
    protected_pids: BTreeSet<u32>,
    require_confirmation: bool,
}

impl ProtectionPolicy {
    pub fn new<P>(
        dangerous_commands: Vec<String>,
        protected_processes: Vec<String>,
        protected_pids: P,
        require_confirmation: bool,
    ) -> Result<Self>
    where
        P: IntoIterator<Item = u32>,
    {
        let dangerous = dangerous_commands
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(DangerousPattern::compile)
            .collect::<Result<Vec<_>>>()?;

        let protected_names = protected_processes
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();

        let policy = Self {
            dangerous,
            protected_names,
            protected_pids: protected_pids.into_iter().collect(),
            require_confirmation,
        };
        policy.check_invariants()?;
        Ok(policy)
    }

    /// Verify that PID 1 and the required init names are protected.
    pub fn check_invariants(&self) -> Result<()> {
        if !self.protected_pids.contains(&INIT_PID) {
            return Err(CmdguardError::Policy(format!(
                "protected PIDs must include PID {INIT_PID}"
            )));
        }
        for required in REQUIRED_PROTECTED_NAMES {
            if !self
                .protected_names
                .iter()
                .any(|n| n.eq_ignore_ascii_case(required))
            {
                return Err(CmdguardError::Policy(format!(
                    "protected process names must include '{required}'"
                )));
            }
        }
        Ok(())
    }

    /// First dangerous-command entry found in `command`, if any.
    pub fn matching_dangerous(&self, command: &str) -> Option<&str> {
        self.dangerous
            .iter()
            .find(|p| p.matcher.is_match(command))
            .map(|p| p.text.as_str())
    }

    pub fn is_protected_pid(&self, pid: u32) -> bool {
        self.protected_pids.contains(&pid)
    }

    /// First protected name contained (case-insensitively) in `name`.
    pub fn matching_protected_name(&self, name: &str) -> Option<&str> {
        let name = name.to_lowercase();
        self.protected_names
            .iter()
            .find(|p| name.contains(&p.to_lowercase()))
            .map(String::as_str)
    }

    pub fn require_confirmation(&self) -> bool {
        self.require_confirmation
    }

    pub fn dangerous_commands(&self) -> impl Iterator<Item = &str> {
        self.dangerous.iter().map(|p| p.text.as_str())
    }

    pub fn protected_names(&self) -> &[String] {
        &self.protected_names
    }

    pub fn protected_pids(&self) -> &BTreeSet<u32> {
        &self.protected_pids
    }
}
