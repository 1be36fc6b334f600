#![cfg_attr(not(target_os = "windows"), allow(dead_code))]

use crate::error::{Error, Result};
use crate::process::provider::ProcessInfo;
use crate::process::region::{MemoryRegion, QueryRegions};

#[cfg(target_os = "windows")]
use tracing::warn;

#[cfg(target_os = "windows")]
use std::ffi::{OsString, c_void};
#[cfg(target_os = "windows")]
use std::os::windows::ffi::OsStringExt;
#[cfg(target_os = "windows")]
use windows::Win32::Foundation::{CloseHandle, HANDLE};
#[cfg(target_os = "windows")]
use windows::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, PROCESSENTRY32W, Process32FirstW, Process32NextW, TH32CS_SNAPPROCESS,
};
#[cfg(target_os = "windows")]
use windows::Win32::System::Memory::{MEMORY_BASIC_INFORMATION, VirtualQueryEx};
#[cfg(target_os = "windows")]
use windows::Win32::System::Threading::{
    GetExitCodeProcess, OpenProcess, PROCESS_QUERY_INFORMATION, PROCESS_VM_READ,
};

/// An open, read-only handle to a running game process.
#[cfg(target_os = "windows")]
pub struct ProcessHandle {
    handle: HANDLE,
    pub pid: u32,
}

#[cfg(not(target_os = "windows"))]
pub struct ProcessHandle {
    pub pid: u32,
}

#[cfg(target_os = "windows")]
impl ProcessHandle {
    /// Locate the first process whose executable matches `name` and open it.
    pub fn find_and_open(name: &str) -> Result<Self> {
        let pid = find_process_id(name).map_err(|e| {
            tracing::debug!("Process detection failed: {}", e);
            e
        })?;
        tracing::debug!("Found {} with PID {}", name, pid);
        Self::open(pid)
    }

    pub fn open(pid: u32) -> Result<Self> {
        // SAFETY: OpenProcess is called with valid access flags and a process ID from the
        // ToolHelp snapshot or the caller. The returned handle is owned by this struct and
        // closed in Drop.
        let handle = unsafe {
            OpenProcess(PROCESS_QUERY_INFORMATION | PROCESS_VM_READ, false, pid).map_err(|e| {
                tracing::debug!("OpenProcess failed for PID {}: {}", pid, e);
                Error::ProcessOpenFailed(e.to_string())
            })?
        };

        Ok(Self { handle, pid })
    }

    pub fn handle(&self) -> HANDLE {
        self.handle
    }

    /// Check if the process is still running
    pub fn is_alive(&self) -> bool {
        const STILL_ACTIVE: u32 = 259;

        let mut exit_code: u32 = 0;
        // SAFETY: GetExitCodeProcess is called with a valid process handle obtained from OpenProcess.
        unsafe {
            if GetExitCodeProcess(self.handle, &mut exit_code).is_ok() {
                exit_code == STILL_ACTIVE
            } else {
                false
            }
        }
    }
}

#[cfg(target_os = "windows")]
impl QueryRegions for ProcessHandle {
    fn query_region(&self, address: u64) -> Option<MemoryRegion> {
        let mut info = MEMORY_BASIC_INFORMATION::default();

        // SAFETY: VirtualQueryEx only inspects the target's address space. The info struct is
        // owned here and its exact size is passed in.
        let written = unsafe {
            VirtualQueryEx(
                self.handle,
                Some(address as *const c_void),
                &mut info,
                std::mem::size_of::<MEMORY_BASIC_INFORMATION>(),
            )
        };

        // Zero means the address is past the end of the user address space
        if written == 0 {
            return None;
        }

        Some(MemoryRegion {
            base: info.BaseAddress as u64,
            size: info.RegionSize as u64,
            state: info.State.0,
            protect: info.Protect.0,
        })
    }
}

#[cfg(not(target_os = "windows"))]
impl ProcessHandle {
    pub fn find_and_open(_name: &str) -> Result<Self> {
        Err(Error::ProcessNotFound(
            "Windows only: process access not supported on this platform".to_string(),
        ))
    }

    pub fn open(_pid: u32) -> Result<Self> {
        Err(Error::ProcessOpenFailed(
            "Windows only: process access not supported on this platform".to_string(),
        ))
    }

    /// Check if the process is still running (stub for non-Windows)
    pub fn is_alive(&self) -> bool {
        false
    }
}

#[cfg(not(target_os = "windows"))]
impl QueryRegions for ProcessHandle {
    fn query_region(&self, _address: u64) -> Option<MemoryRegion> {
        None
    }
}

impl ProcessInfo for ProcessHandle {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn is_alive(&self) -> bool {
        ProcessHandle::is_alive(self)
    }
}

#[cfg(target_os = "windows")]
impl Drop for ProcessHandle {
    fn drop(&mut self) {
        if !self.handle.is_invalid() {
            // SAFETY: self.handle came from OpenProcess and has not been closed yet.
            if let Err(e) = unsafe { CloseHandle(self.handle) } {
                warn!("Failed to close process handle: {}", e);
            }
        }
    }
}

/// Match an executable name, tolerating a missing `.exe` suffix on either side.
pub(crate) fn exe_name_matches(exe: &str, wanted: &str) -> bool {
    fn stem(name: &str) -> &str {
        let len = name.len();
        if len > 4 && name.is_char_boundary(len - 4) && name[len - 4..].eq_ignore_ascii_case(".exe")
        {
            &name[..len - 4]
        } else {
            name
        }
    }
    stem(exe).eq_ignore_ascii_case(stem(wanted))
}

#[cfg(target_os = "windows")]
fn find_process_id(name: &str) -> Result<u32> {
    // SAFETY: CreateToolhelp32Snapshot with TH32CS_SNAPPROCESS is safe to call.
    // The returned handle is closed at the end of this function.
    let snapshot = unsafe {
        CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0)
            .map_err(|e| Error::ProcessNotFound(e.to_string()))?
    };

    let mut entry = PROCESSENTRY32W {
        dwSize: std::mem::size_of::<PROCESSENTRY32W>() as u32,
        ..Default::default()
    };

    // SAFETY: Process32FirstW/NextW take the valid snapshot handle and an initialized entry.
    // szExeFile is null-terminated by the API.
    let mut found = None;
    unsafe {
        if Process32FirstW(snapshot, &mut entry).is_ok() {
            loop {
                let len = entry
                    .szExeFile
                    .iter()
                    .position(|&c| c == 0)
                    .unwrap_or(entry.szExeFile.len());
                let exe_name = OsString::from_wide(&entry.szExeFile[..len]);

                if exe_name_matches(&exe_name.to_string_lossy(), name) {
                    found = Some(entry.th32ProcessID);
                    break;
                }

                if Process32NextW(snapshot, &mut entry).is_err() {
                    break;
                }
            }
        }
    }

    // SAFETY: snapshot is a valid handle from CreateToolhelp32Snapshot
    let _ = unsafe { CloseHandle(snapshot) };

    found.ok_or_else(|| Error::ProcessNotFound(format!("Process '{}' not found", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exe_name_matches() {
        assert!(exe_name_matches("Celeste.exe", "Celeste.exe"));
        assert!(exe_name_matches("celeste.EXE", "Celeste"));
        assert!(exe_name_matches("Celeste", "Celeste.exe"));
        assert!(!exe_name_matches("CelesteLauncher.exe", "Celeste.exe"));
        assert!(!exe_name_matches(".exe", "Celeste"));
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn test_non_windows_stub() {
        assert!(ProcessHandle::find_and_open("Celeste.exe").is_err());
        assert!(ProcessHandle::open(42).is_err());

        let handle = ProcessHandle { pid: 42 };
        assert_eq!(ProcessInfo::pid(&handle), 42);
        assert!(!ProcessInfo::is_alive(&handle));
        assert!(handle.query_region(0).is_none());
    }
}
