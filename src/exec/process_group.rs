// src/exec/process_group.rs

//! Process-group isolation and group-wide termination.
//!
//! Each command runs as the leader of a fresh process group, so anything the
//! shell forks (pipelines, background jobs) can be signalled as one unit.

use tokio::process::Command;
use tracing::{debug, warn};

/// Put the command's child in its own process group (Unix only).
pub fn isolate(cmd: &mut Command) {
    #[cfg(unix)]
    {
        cmd.process_group(0);
    }
    #[cfg(not(unix))]
    {
        let _ = cmd;
    }
}

/// Send SIGKILL to every process in group `pgid`.
///
/// Returns `true` if the signal was delivered. Group ids 0 and 1 are
/// refused: `killpg(0)` would hit our own group and 1 is init.
#[cfg(unix)]
pub fn kill_group(pgid: u32) -> bool {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pgid) else {
        warn!(pgid, "process group id out of range; not signalling");
        return false;
    };
    if raw <= 1 {
        warn!(pgid, "refusing to signal process group");
        return false;
    }

    match killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        Ok(()) => {
            debug!(pgid, "sent SIGKILL to process group");
            true
        }
        Err(Errno::ESRCH) => {
            debug!(pgid, "process group already gone");
            false
        }
        Err(e) => {
            warn!(pgid, error = %e, "failed to signal process group");
            false
        }
    }
}

#[cfg(not(unix))]
pub fn kill_group(_pgid: u32) -> bool {
    false
}

/// Kills the process group when dropped, unless disarmed first.
///
/// Holding one of these across the awaits of an execution means that if the
/// caller drops the future (cancellation, shutdown) the whole group still
/// gets terminated instead of being orphaned.
#[derive(Debug)]
pub struct ProcessGroupGuard {
    pgid: Option<u32>,
}

impl ProcessGroupGuard {
    /// `pid` is the group leader's PID (equal to the group id after
    /// [`isolate`]). `None` yields an inert guard.
    pub fn new(pid: Option<u32>) -> Self {
        Self { pgid: pid }
    }

    /// Terminate the group now. Later calls and the drop become no-ops.
    pub fn terminate(&mut self) -> bool {
        match self.pgid.take() {
            Some(pgid) => kill_group(pgid),
            None => false,
        }
    }

    /// The command finished normally; leave the group alone.
    pub fn disarm(&mut self) {
        self.pgid = None;
    }
}

impl Drop for ProcessGroupGuard {
    fn drop(&mut self) {
        if let Some(pgid) = self.pgid.take() {
            debug!(pgid, "execution dropped before completion; terminating process group");
            kill_group(pgid);
        }
    }
}
