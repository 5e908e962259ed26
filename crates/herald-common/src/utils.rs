//! Shared utility functions for formatting durations, colours and text.

use std::time::Duration;

/// Formats a duration as a human readable string such as `1 day, 2 hours, 5 seconds`.
///
/// The duration is rounded to the nearest whole second first, so a remaining
/// cooldown of 4.6 seconds is reported as `5 seconds`.
pub fn format_duration(duration: Duration) -> String {
    let mut total = duration.as_secs();
    if duration.subsec_millis() >= 500 {
        total += 1;
    }

    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    let parts: Vec<String> = [
        (days, "day"),
        (hours, "hour"),
        (minutes, "minute"),
        (seconds, "second"),
    ]
    .iter()
    .filter(|(value, _)| *value > 0)
    .map(|(value, unit)| pluralize(*value, unit))
    .collect();

    if parts.is_empty() {
        "0 seconds".to_string()
    } else {
        parts.join(", ")
    }
}

fn pluralize(value: u64, unit: &str) -> String {
    if value == 1 {
        format!("{value} {unit}")
    } else {
        format!("{value} {unit}s")
    }
}

/// Checks whether a string is a `#RRGGBB` hex colour.
pub fn is_hex_color(input: &str) -> bool {
    input.len() == 7
        && input.starts_with('#')
        && input[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Parses a `#RRGGBB` hex colour into its packed RGB value.
pub fn parse_hex_color(input: &str) -> Option<u32> {
    if !is_hex_color(input) {
        return None;
    }
    u32::from_str_radix(&input[1..], 16).ok()
}

/// Truncates a string to a maximum number of characters with ellipsis.
pub fn truncate_string(input: &str, max_length: usize) -> String {
    if input.chars().count() <= max_length {
        input.to_string()
    } else {
        let kept: String = input.chars().take(max_length.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
