//! Main tracking mode command.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use summit_core::{
    Config, Field, RunState, ShutdownSignal, SystemProcessProvider, Tracker, export_csv,
    format_stats_table,
};
use tracing::{debug, info};

use crate::input;

/// Run the main tracking mode
pub fn run(config: &Config, csv: Option<&Path>) -> Result<()> {
    // Setup graceful shutdown handler
    let shutdown = Arc::new(ShutdownSignal::new());
    let shutdown_ctrlc = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal, stopping...");
        shutdown_ctrlc.trigger();
    })?;

    // Spawn keyboard input monitor (Esc, q, Q to quit)
    let _keyboard_handle = input::spawn_keyboard_monitor(Arc::clone(&shutdown));

    info!("Summit {}", env!("CARGO_PKG_VERSION"));

    let provider = SystemProcessProvider::new(&config.process_name);
    let mut tracker = Tracker::new(provider, config)?;
    tracker.state_mut().subscribe(None, report_change);

    println!(
        "Waiting for {}... (Press Esc or q to quit)",
        config.process_name
    );
    tracker.run(&shutdown);

    if let Some(path) = csv {
        export_csv(path, tracker.state().stats())?;
        info!("Exported statistics to {}", path.display());
    }

    Ok(())
}

fn report_change(field: Field, state: &RunState) {
    match field {
        Field::DeathStats => {
            println!();
            println!("{}", format_stats_table(state.stats()));
        }
        // Changes every frame while playing
        Field::ChapterTime => debug!("{}: {}", field, describe(field, state)),
        _ => info!("{}: {}", field, describe(field, state)),
    }
}

/// Current value of `field` as shown in logs.
fn describe(field: Field, state: &RunState) -> String {
    match field {
        Field::ChapterName => match state.chapter_name() {
            "" => state.chapter_id().to_string(),
            name => name.to_string(),
        },
        Field::Side => state.side_name().to_string(),
        Field::ChapterTime => state.elapsed_display(),
        Field::RoomName => state.location_display(),
        Field::ChapterDeathCount => state.chapter_death_count().to_string(),
        Field::RoomDeathCount => state.location_death_count().to_string(),
        Field::DeathStats => format!("{} rooms", state.stats().len()),
        Field::Status => state.status_text().to_string(),
    }
}
