//! Export formats for attempt statistics.

mod console;
mod format;
mod session;

pub use console::format_stats_table;
pub use format::{csv_escape, format_elapsed, format_percentage, rate_color};
pub use session::SessionManager;

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::stats::AttemptStat;

pub const CSV_HEADER: &str =
    "Room,Previous Deaths,Current Deaths,Total Deaths,Previous Successes,Total Successes";

pub fn format_csv_row(stat: &AttemptStat) -> String {
    [
        csv_escape(&stat.location.to_string()),
        stat.historical_deaths.to_string(),
        stat.current_deaths_display(),
        stat.total_deaths().to_string(),
        stat.historical_successes.to_string(),
        stat.total_successes().to_string(),
    ]
    .join(",")
}

/// Header plus one row per stat, every line terminated by `\n`.
pub fn format_csv(stats: &[AttemptStat]) -> String {
    let mut out = String::with_capacity(CSV_HEADER.len() + 1 + stats.len() * 32);
    out.push_str(CSV_HEADER);
    out.push('\n');
    for stat in stats {
        out.push_str(&format_csv_row(stat));
        out.push('\n');
    }
    out
}

pub fn export_csv<P: AsRef<Path>>(path: P, stats: &[AttemptStat]) -> Result<()> {
    fs::write(path, format_csv(stats))?;
    Ok(())
}
