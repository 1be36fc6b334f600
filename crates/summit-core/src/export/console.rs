//! Console output formatting with colored display

use std::fmt::Write as _;

use owo_colors::OwoColorize;

use crate::stats::AttemptStat;

use super::format::{format_percentage, rate_color};

const ROOM_WIDTH: usize = 24;

/// Render the stats as an aligned table, one room per line.
///
/// The rate column is coloured on a red-yellow-green gradient.
pub fn format_stats_table(stats: &[AttemptStat]) -> String {
    let mut output = String::new();

    let header = format!(
        "{:<width$} {:>6} {:>6} {:>6} {:>7}",
        "ROOM",
        "NOW",
        "DEATHS",
        "CLEARS",
        "RATE",
        width = ROOM_WIDTH
    );
    let _ = writeln!(output, "{}", header.bold());
    let _ = writeln!(output, "{}", "━".repeat(header.len()).dimmed());

    if stats.is_empty() {
        let _ = write!(output, "{}", "(no rooms visited)".dimmed());
        return output;
    }

    for (i, stat) in stats.iter().enumerate() {
        let rate = stat.success_rate();
        let (r, g, b) = rate_color(rate);
        let rate_text = format!("{:>7}", format_percentage(rate));

        let _ = write!(
            output,
            "{:<width$} {:>6} {:>6} {:>6} {}",
            truncate(&stat.location.to_string(), ROOM_WIDTH),
            stat.current_deaths_display(),
            stat.total_deaths(),
            stat.total_successes(),
            rate_text.truecolor(r, g, b),
            width = ROOM_WIDTH
        );
        if i + 1 < stats.len() {
            output.push('\n');
        }
    }

    output
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let kept: String = text.chars().take(width - 1).collect();
        format!("{}…", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::LocationId;

    #[test]
    fn test_empty_table() {
        let table = format_stats_table(&[]);
        assert!(table.contains("ROOM"));
        assert!(table.contains("(no rooms visited)"));
    }

    #[test]
    fn test_rows_in_order() {
        let mut first = AttemptStat::new(LocationId::new("a-00", "a-00"));
        first.historical_successes = 1;
        first.historical_deaths = 1;
        let second = AttemptStat::new(LocationId::new("a-00", "a-01"));

        let table = format_stats_table(&[first, second]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("a-00 "));
        assert!(lines[2].contains("50.0%"));
        assert!(lines[3].starts_with("a-01 (via a-00)"));
        assert!(lines[3].contains("0.0%"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}
