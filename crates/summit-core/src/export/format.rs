//! Display formatting shared by the CSV, console and status outputs.

/// Format elapsed milliseconds as `m:ss.mmm`, or `h:mm:ss.mmm` from one hour.
/// Negative values clamp to zero.
pub fn format_elapsed(ms: i64) -> String {
    let ms = ms.max(0);
    let millis = ms % 1000;
    let total_seconds = ms / 1000;
    let seconds = total_seconds % 60;
    let minutes = (total_seconds / 60) % 60;
    let hours = total_seconds / 3600;

    if hours > 0 {
        format!("{}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
    } else {
        format!("{}:{:02}.{:03}", minutes, seconds, millis)
    }
}

/// Format a 0..=1 ratio as a percentage with one decimal (`42.5%`).
pub fn format_percentage(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

/// Quote a CSV field if it contains a comma, quote or line break.
pub fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Success-rate colour: red at 0, yellow at 0.5, green at 1.
pub fn rate_color(rate: f64) -> (u8, u8, u8) {
    const SATURATION: f64 = 0.7;
    let floor = 1.0 - SATURATION;
    let h = rate.clamp(0.0, 1.0) * 2.0;

    let (r, g, b) = if h < 1.0 {
        (1.0, floor + (1.0 - floor) * h, floor)
    } else {
        (1.0 - (1.0 - floor) * (h - 1.0), 1.0, floor)
    };

    (denorm(r), denorm(g), denorm(b))
}

fn denorm(value: f64) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}
