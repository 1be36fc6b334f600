//! CLI command implementations.

pub mod scan;
pub mod status;
pub mod track;

use anyhow::{Context, Result};
use summit_core::game::{Hook, discover_title_offset, locate_base_pointer};
use summit_core::{Config, ProcessHandle, ProcessProvider, SystemProcessProvider};

/// Open the game process by PID, or look it up by the configured name.
pub fn open_game(config: &Config, pid: Option<u32>) -> Result<ProcessHandle> {
    let provider = SystemProcessProvider::new(&config.process_name);
    let process = if let Some(pid) = pid {
        println!("Opening process with PID {}...", pid);
        provider.open_process(pid)?
    } else {
        println!("Searching for {}...", provider.name());
        provider.find_process()?
    };
    println!("Found process (PID: {})", process.pid);
    Ok(process)
}

/// Run discovery against an open process.
pub fn discover(config: &Config, process: &ProcessHandle) -> Result<Hook> {
    let signature = config.signature.compile()?;
    let base = locate_base_pointer(process, &signature)?;
    let offset = discover_title_offset(process, base.address)
        .context("Game object found but the title string is not in it")?;
    Ok(Hook::new(base, offset))
}
