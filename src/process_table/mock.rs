// src/process_table/mock.rs

use std::sync::{Arc, Mutex};

use super::{ProcessRecord, ProcessTable};

/// In-memory process table with a fixed set of records.
///
/// Clones share the same records, so a test can keep a handle and add
/// processes after handing the table to a validator.
#[derive(Debug, Clone, Default)]
pub struct MockProcessTable {
    processes: Arc<Mutex<Vec<ProcessRecord>>>,
}

impl MockProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_process(&self, pid: u32, name: &str, cmdline: &str) {
        let mut processes = self.processes.lock().unwrap_or_else(|e| e.into_inner());
        processes.retain(|p| p.pid != pid);
        processes.push(ProcessRecord {
            pid,
            name: name.to_string(),
            cmdline: cmdline.to_string(),
        });
    }

    pub fn with_process(self, pid: u32, name: &str, cmdline: &str) -> Self {
        self.add_process(pid, name, cmdline);
        self
    }

    fn snapshot(&self) -> Vec<ProcessRecord> {
        self.processes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl ProcessTable for MockProcessTable {
    fn lookup(&self, pid: u32) -> Option<ProcessRecord> {
        self.snapshot().into_iter().find(|p| p.pid == pid)
    }

    fn find_by_name(&self, needle: &str) -> Vec<ProcessRecord> {
        let needle = needle.to_lowercase();
        let mut matches: Vec<ProcessRecord> = self
            .snapshot()
            .into_iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .collect();
        matches.sort_by_key(|r| r.pid);
        matches
    }
}
