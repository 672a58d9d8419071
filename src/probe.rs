//! Liveness check for the managed server process.
use std::ffi::OsStr;

use sysinfo::{ProcessesToUpdate, System};
use tracing::debug;

/// Answers whether the managed server is currently alive.
///
/// Implementations must re-query on every call; callers rely on the answer being no older
/// than the action that asked for it.
pub trait ProcessProbe: Send + Sync {
    /// Returns `true` when at least one matching process is alive.
    fn is_running(&self) -> bool;
}

/// Probe backed by a fresh process table snapshot on every call.
#[derive(Debug, Clone)]
pub struct ProcessTableProbe {
    process_name: String,
}

impl ProcessTableProbe {
    /// Creates a probe matching processes whose name equals `process_name` exactly.
    pub fn new(process_name: impl Into<String>) -> Self {
        Self {
            process_name: process_name.into(),
        }
    }

    /// The name being matched.
    pub fn process_name(&self) -> &str {
        &self.process_name
    }
}

impl ProcessProbe for ProcessTableProbe {
    fn is_running(&self) -> bool {
        let mut system = System::new();
        // Processes that exit between listing and reading simply drop out of the snapshot.
        system.refresh_processes(ProcessesToUpdate::All, true);

        let target = OsStr::new(&self.process_name);
        let running = system
            .processes()
            .values()
            .any(|process| process.name() == target);

        debug!("Probe for '{}': running={running}", self.process_name);
        running
    }
}
