//! Display helpers.

use std::time::Duration;

/// Compact XP figure: `950`, `1.2k`, `15.0k`.
pub fn format_xp(xp: u64) -> String {
    if xp >= 1000 {
        format!("{:.1}k", xp as f64 / 1000.0)
    } else {
        xp.to_string()
    }
}

/// Elapsed time as `m:ss`.
pub fn format_duration(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}
