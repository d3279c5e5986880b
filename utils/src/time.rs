//! Duration formatting helpers for user-facing messages.

use std::time::Duration;

/// Format a duration as `H:MM:SS`, flooring sub-second remainders.
///
/// Hours are not wrapped at 24, so a 30 hour wait renders as `30:00:00`.
pub fn format_hms(d: Duration) -> String {
    let secs = d.as_secs();
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    format!("{hours}:{minutes:02}:{seconds:02}")
}

/// Describe a window length in words, e.g. `24 hours` or `5 minutes`.
///
/// Picks the largest unit that divides the duration evenly.
pub fn describe_duration(d: Duration) -> String {
    let secs = d.as_secs();
    let (amount, unit) = if secs != 0 && secs % 86_400 == 0 && secs > 86_400 {
        (secs / 86_400, "day")
    } else if secs != 0 && secs % 3600 == 0 {
        (secs / 3600, "hour")
    } else if secs != 0 && secs % 60 == 0 {
        (secs / 60, "minute")
    } else {
        (secs, "second")
    };
    if amount == 1 {
        format!("1 {unit}")
    } else {
        format!("{amount} {unit}s")
    }
}
