// src/process_table/mod.rs

//! Read-only view of the OS process table.
//!
//! The safety validator only ever asks two questions: "what is running as
//! PID n?" and "which processes have a name containing x?". Both go through
//! the [`ProcessTable`] trait so tests can substitute a fixed table
//! ([`mock::MockProcessTable`]) for the live one.

use std::ffi::OsString;
use std::fmt::Debug;

use sysinfo::{Pid, Process, ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind};
use tracing::debug;

pub mod mock;

/// Display record for one running process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    pub pid: u32,
    pub name: String,
    pub cmdline: String,
}

/// Abstract, read-only process table.
pub trait ProcessTable: Send + Sync + Debug {
    /// Look up a process by PID. `None` if it does not exist or cannot be
    /// inspected.
    fn lookup(&self, pid: u32) -> Option<ProcessRecord>;

    /// All processes whose name contains `needle`, case-insensitively.
    fn find_by_name(&self, needle: &str) -> Vec<ProcessRecord>;
}

/// Implementation backed by `sysinfo`.
///
/// Every call takes a fresh snapshot; nothing is cached between calls.
#[derive(Debug, Clone, Default)]
pub struct RealProcessTable;

impl RealProcessTable {
    fn refresh_kind() -> ProcessRefreshKind {
        ProcessRefreshKind::nothing().with_cmd(UpdateKind::OnlyIfNotSet)
    }
}

impl ProcessTable for RealProcessTable {
    fn lookup(&self, pid: u32) -> Option<ProcessRecord> {
        let pid = Pid::from_u32(pid);
        let mut system = System::new();
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            Self::refresh_kind(),
        );
        let record = system.process(pid).map(record_from);
        debug!(pid = pid.as_u32(), found = record.is_some(), "process table lookup");
        record
    }

    fn find_by_name(&self, needle: &str) -> Vec<ProcessRecord> {
        let needle = needle.to_lowercase();
        let mut system = System::new();
        system.refresh_processes_specifics(ProcessesToUpdate::All, true, Self::refresh_kind());

        let mut matches: Vec<ProcessRecord> = system
            .processes()
            .values()
            .filter(|p| p.name().to_string_lossy().to_lowercase().contains(&needle))
            .map(record_from)
            .collect();
        matches.sort_by_key(|r| r.pid);
        debug!(needle = %needle, count = matches.len(), "process table name scan");
        matches
    }
}

fn record_from(process: &Process) -> ProcessRecord {
    ProcessRecord {
        pid: process.pid().as_u32(),
        name: process.name().to_string_lossy().into_owned(),
        cmdline: join_cmdline(process.cmd()),
    }
}

fn join_cmdline(parts: &[OsString]) -> String {
    parts
        .iter()
        .map(|p| p.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}
