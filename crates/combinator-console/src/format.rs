//! Display helpers.

const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Formats a byte count with two decimals in the largest fitting unit,
/// capped at GB.
#[allow(clippy::cast_precision_loss)]
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}
