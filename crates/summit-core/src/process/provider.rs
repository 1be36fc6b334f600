//! Process provider abstraction for testability.
//!
//! The tracker only ever talks to a [`ProcessProvider`], so the same hook and
//! polling logic runs against the real game or an in-memory mock.

use crate::error::Result;
use crate::process::handle::ProcessHandle;
use crate::process::reader::ReadMemory;
use crate::process::region::QueryRegions;

/// Trait for accessing process information.
pub trait ProcessInfo {
    /// Get the process ID.
    fn pid(&self) -> u32;

    /// Check if the process is still running.
    fn is_alive(&self) -> bool;
}

/// Trait for finding and opening processes.
pub trait ProcessProvider {
    /// An open process: its identity, its memory, and its region layout.
    type Process: ProcessInfo + ReadMemory + QueryRegions;

    /// Find and open the target game process.
    fn find_process(&self) -> Result<Self::Process>;

    /// Open a process by its PID.
    fn open_process(&self, pid: u32) -> Result<Self::Process>;
}

/// Provider backed by the operating system, looking processes up by executable name.
#[derive(Debug, Clone)]
pub struct SystemProcessProvider {
    name: String,
}

impl SystemProcessProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ProcessProvider for SystemProcessProvider {
    type Process = ProcessHandle;

    fn find_process(&self) -> Result<Self::Process> {
        ProcessHandle::find_and_open(&self.name)
    }

    fn open_process(&self, pid: u32) -> Result<Self::Process> {
        ProcessHandle::open(pid)
    }
}
