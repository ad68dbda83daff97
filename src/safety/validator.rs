// src/safety/validator.rs

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::errors::Result;
use crate::process_table::{ProcessTable, RealProcessTable};
use crate::safety::policy::ProtectionPolicy;
use crate::safety::{
    Confirmation, KillTarget, KillValidation, ProtectionCheck, SafetyDecision,
};

/// Programs whose last argument names the process(es) to signal.
pub const KILL_PROGRAMS: &[&str] = &["kill", "killall", "pkill"];

/// `systemctl` actions that take a service down.
pub const STOP_ACTIONS: &[&str] = &["stop", "disable", "mask"];

const UNIT_SUFFIXES: &[&str] = &[
    ".service",
    ".socket",
    ".timer",
    ".target",
    ".path",
    ".mount",
    ".automount",
    ".swap",
    ".slice",
    ".scope",
    ".device",
];

const TERMINATE_REASON: &str = "This command will terminate processes";
const DESTRUCTIVE_REASON: &str = "This is a potentially destructive command";

/// Classifies command strings against the [`ProtectionPolicy`].
///
/// All methods are pure functions of the policy, the input and (for PID and
/// name resolution) a read-only process table snapshot. Validating the same
/// command twice against an unchanged process table gives the same verdict.
#[derive(Debug, Clone)]
pub struct SafetyValidator {
    settings: Arc<Settings>,
    processes: Arc<dyn ProcessTable>,
}

impl SafetyValidator {
    /// Validator backed by the live OS process table.
    pub fn new(settings: Arc<Settings>) -> Result<Self> {
        Self::with_process_table(settings, Arc::new(RealProcessTable))
    }

    /// Validator backed by a caller-provided process table.
    ///
    /// Re-checks the policy invariants; a policy missing PID 1 or the init
    /// names is refused here rather than discovered mid-run.
    pub fn with_process_table(
        settings: Arc<Settings>,
        processes: Arc<dyn ProcessTable>,
    ) -> Result<Self> {
        settings.policy().check_invariants()?;
        Ok(Self {
            settings,
            processes,
        })
    }

    pub fn policy(&self) -> &ProtectionPolicy {
        self.settings.policy()
    }

    /// Whole-word, case-insensitive match against the dangerous-command list.
    ///
    /// `rm` matches `rm -rf /` but not `form`.
    pub fn is_dangerous(&self, command: &str) -> bool {
        match self.policy().matching_dangerous(command.trim()) {
            Some(matched) => {
                debug!(command = %command, matched = %matched, "dangerous command detected");
                true
            }
            None => false,
        }
    }

    /// Is the process named by `identifier` (a PID or a process/service
    /// name) protected?
    ///
    /// Numeric identifiers are checked against the protected PIDs first,
    /// then resolved to a name through the process table. A PID that does
    /// not exist (or cannot be inspected) is not protected: there is nothing
    /// running to protect. `-1`, which signals every process, is always
    /// protected; other negative values name a process group and are checked
    /// as the group leader's PID.
    pub fn is_protected(&self, identifier: &str) -> ProtectionCheck {
        let identifier = identifier.trim();

        let name = match identifier.parse::<i64>() {
            Ok(-1) => {
                return ProtectionCheck::protected(
                    "PID -1 addresses every process on the system".to_string(),
                );
            }
            Ok(n) => {
                let Ok(pid) = u32::try_from(n.unsigned_abs()) else {
                    return ProtectionCheck::unprotected();
                };
                if self.policy().is_protected_pid(pid) {
                    return ProtectionCheck::protected(format!(
                        "PID {pid} is a protected system process"
                    ));
                }
                match self.processes.lookup(pid) {
                    Some(record) => record.name,
                    None => {
                        debug!(pid, "no such process; treating as unprotected");
                        return ProtectionCheck::unprotected();
                    }
                }
            }
            Err(_) => identifier.to_string(),
        };

        match self.policy().matching_protected_name(&name) {
            Some(protected) => {
                ProtectionCheck::protected(format!("'{protected}' is a protected system process"))
            }
            None => ProtectionCheck::unprotected(),
        }
    }

    /// Validate a process-termination or service-stop command.
    ///
    /// - `kill` / `killall` / `pkill`: the **last token** is the target.
    ///   Flags placed after the target (`kill 1234 --verbose`) are therefore
    ///   misread as the target; this is a known limitation.
    /// - `systemctl stop|disable|mask <service>`: the unit suffix
    ///   (`.service`, `.socket`, ...) is stripped before the lookup.
    /// - Anything else is safe as far as this check is concerned.
    pub fn validate_kill(&self, command: &str) -> KillValidation {
        let tokens: Vec<&str> = command.split_whitespace().collect();
        let Some(first) = tokens.first() else {
            return KillValidation::malformed("Empty command");
        };
        let program = program_name(first);

        if KILL_PROGRAMS.contains(&program.as_str()) {
            let Some(target) = tokens.last().filter(|_| tokens.len() >= 2) else {
                return KillValidation::malformed(format!("No target specified for {program}"));
            };

            let check = self.is_protected(target);
            if let (true, Some(reason)) = (check.is_protected, check.reason) {
                warn!(command = %command, target = %target, reason = %reason, "refusing to signal protected process");
                return KillValidation::refused(target, reason);
            }

            return KillValidation::safe(self.describe_target(target));
        }

        if program == "systemctl" {
            if tokens.len() < 3 {
                return KillValidation::malformed("Incomplete systemctl command");
            }
            let action = tokens[1];
            let service = tokens[2];

            if STOP_ACTIONS.contains(&action) {
                let check = self.is_protected(strip_unit_suffix(service));
                if let (true, Some(reason)) = (check.is_protected, check.reason) {
                    warn!(command = %command, service = %service, reason = %reason, "refusing to stop protected service");
                    return KillValidation::refused(service, reason);
                }
                return KillValidation::safe(Some(KillTarget::Service {
                    service: service.to_string(),
                    action: action.to_string(),
                }));
            }
        }

        KillValidation::safe(None)
    }

    /// Is `command` a kill/stop variant that [`validate_kill`](Self::validate_kill)
    /// specialises?
    pub fn is_kill_variant(&self, command: &str) -> bool {
        let mut tokens = command.split_whitespace();
        let Some(first) = tokens.next() else {
            return false;
        };
        let program = program_name(first);
        if KILL_PROGRAMS.contains(&program.as_str()) {
            return true;
        }
        program == "systemctl" && tokens.next().is_some_and(|a| STOP_ACTIONS.contains(&a))
    }

    /// Does `command` need explicit user confirmation before it runs?
    ///
    /// An unsafe kill/stop also comes back as "required" with the block
    /// reason; callers that need to tell a hard block from a prompt should
    /// use [`assess`](Self::assess) and [`SafetyDecision::is_blocked`].
    pub fn requires_confirmation(&self, command: &str) -> Confirmation {
        if !self.policy().require_confirmation() {
            return Confirmation::not_required();
        }
        if !self.is_dangerous(command) {
            return Confirmation::not_required();
        }
        let kill = self
            .is_kill_variant(command)
            .then(|| self.validate_kill(command));
        confirmation_from(kill.as_ref())
    }

    /// Full verdict for one command.
    ///
    /// Protected targets are reported even when confirmation is disabled by
    /// policy, since those must never run.
    pub fn assess(&self, command: &str) -> SafetyDecision {
        let is_dangerous = self.is_dangerous(command);
        let kill = self
            .is_kill_variant(command)
            .then(|| self.validate_kill(command));

        let confirmation = if self.policy().require_confirmation() && is_dangerous {
            confirmation_from(kill.as_ref())
        } else {
            Confirmation::not_required()
        };

        let protected_target = kill.and_then(|v| v.protected);
        let reason = protected_target
            .as_ref()
            .map(|p| p.reason.clone())
            .or(confirmation.reason);

        let decision = SafetyDecision {
            command: command.to_string(),
            is_dangerous,
            requires_confirmation: confirmation.required,
            reason,
            protected_target,
        };
        info!(
            command = %command,
            dangerous = decision.is_dangerous,
            confirm = decision.requires_confirmation,
            blocked = decision.is_blocked(),
            "assessed command"
        );
        decision
    }

    /// Best-effort display info for a kill target. Finding nothing is fine.
    fn describe_target(&self, target: &str) -> Option<KillTarget> {
        match target.parse::<i64>() {
            Ok(n) => {
                let pid = u32::try_from(n.unsigned_abs()).ok()?;
                self.processes.lookup(pid).map(KillTarget::Process)
            }
            Err(_) => {
                let matches = self.processes.find_by_name(target);
                (!matches.is_empty()).then_some(KillTarget::Matches(matches))
            }
        }
    }
}

fn confirmation_from(kill: Option<&KillValidation>) -> Confirmation {
    match kill {
        Some(v) if !v.is_safe => Confirmation::required(
            v.error
                .clone()
                .unwrap_or_else(|| "Command failed kill validation".to_string()),
        ),
        Some(v) => Confirmation::required(termination_reason(v.target.as_ref())),
        None => Confirmation::required(DESTRUCTIVE_REASON),
    }
}

fn termination_reason(target: Option<&KillTarget>) -> String {
    match target {
        Some(KillTarget::Matches(matches)) => {
            format!("{TERMINATE_REASON} ({} matching processes)", matches.len())
        }
        Some(KillTarget::Service { service, .. }) => {
            format!("{TERMINATE_REASON} (service: {service})")
        }
        Some(KillTarget::Process(record)) => {
            format!("{TERMINATE_REASON} ({}, PID {})", record.name, record.pid)
        }
        None => TERMINATE_REASON.to_string(),
    }
}

/// `/usr/bin/kill` → `kill`, lowercased.
fn program_name(token: &str) -> String {
    token.rsplit('/').next().unwrap_or(token).to_lowercase()
}

fn strip_unit_suffix(service: &str) -> &str {
    UNIT_SUFFIXES
        .iter()
        .find_map(|suffix| service.strip_suffix(suffix))
        .unwrap_or(service)
}
