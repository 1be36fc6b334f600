//! Status command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use summit_core::export::format_elapsed;
use summit_core::{Config, Snapshot};

#[derive(Serialize)]
struct StatusReport {
    pid: u32,
    signature_address: u64,
    base_address: u64,
    title_offset: i32,
    chapter: &'static str,
    side_name: &'static str,
    snapshot: Snapshot,
}

/// Run the status command
pub fn run(config: &Config, pid: Option<u32>, json: bool) -> Result<()> {
    let process = super::open_game(config, pid)?;
    let hook = super::discover(config, &process)?;
    let snapshot = hook
        .snapshot(&process)
        .context("Game state is not readable right now (loading screen?)")?;

    if json {
        let report = StatusReport {
            pid: process.pid,
            signature_address: hook.base.signature_address,
            base_address: hook.base.address,
            title_offset: hook.title_offset(),
            chapter: snapshot.chapter_name(),
            side_name: snapshot.side_name(),
            snapshot,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!("=== Game State ===");
    let chapter = match snapshot.chapter_name() {
        "" => format!("unknown ({})", snapshot.chapter_id),
        name => name.to_string(),
    };
    println!("Chapter:   {} {}", chapter, snapshot.side_name());
    println!("Room:      {}", snapshot.location);
    println!("Time:      {}", format_elapsed(snapshot.elapsed_ms));
    println!(
        "Deaths:    {} in chapter, {} in room",
        snapshot.chapter_deaths, snapshot.location_deaths
    );
    println!(
        "Completed: {}",
        if snapshot.completed { "yes" } else { "no" }
    );

    Ok(())
}
