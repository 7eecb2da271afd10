//! Formatting helpers for presenting session and habit times.

/// `MM:SS` under an hour, `H:MM:SS` from an hour on.
pub fn format_duration(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

/// Whole minutes, rounded down; for "12 / 30 min" style summaries.
pub fn whole_minutes(total_secs: u64) -> u64 {
    total_secs / 60
}
