//! Scan command implementation.
//!
//! Runs each discovery stage against the live process and reports where it
//! stops.

use anyhow::{Result, bail};
use summit_core::Config;
use summit_core::game::{discover_title_offset, locate_base_pointer};
use summit_core::process::scannable_regions;

/// Run the scan command
pub fn run(config: &Config, pid: Option<u32>) -> Result<()> {
    let process = super::open_game(config, pid)?;
    let signature = config.signature.compile()?;

    let regions = scannable_regions(&process);
    let total: u64 = regions.iter().map(|r| r.size).sum();
    println!(
        "Scanning {} regions ({:.1} MiB) for a {}-byte signature...",
        regions.len(),
        total as f64 / (1024.0 * 1024.0),
        signature.len()
    );

    let base = locate_base_pointer(&process, &signature)?;
    println!("Signature match:  0x{:08X}", base.signature_address);
    println!("Base pointer:     0x{:08X}", base.address);

    let Some(offset) = discover_title_offset(&process, base.address) else {
        bail!("Title string not found in the game object");
    };
    println!("Title offset:     0x{:X}", offset);

    Ok(())
}
