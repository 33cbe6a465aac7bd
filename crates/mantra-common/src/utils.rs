//! Shared utility functions.

use chrono::Duration;

/// Formats a duration as a compact human readable string, e.g. `2d 3h 4m`.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);
    let (days, hours, minutes, seconds) = (
        total / 86_400,
        (total % 86_400) / 3_600,
        (total % 3_600) / 60,
        total % 60,
    );

    match (days, hours, minutes) {
        (0, 0, 0) => format!("{seconds}s"),
        (0, 0, _) => format!("{minutes}m {seconds}s"),
        (0, _, _) => format!("{hours}h {minutes}m"),
        _ => format!("{days}d {hours}h {minutes}m"),
    }
}

/// Maximum number of characters in a command prefix.
pub const MAX_PREFIX_LEN: usize = 16;

/// Checks that a command prefix is usable, returning the reason it is not.
pub fn validate_prefix(prefix: &str) -> std::result::Result<(), &'static str> {
    if prefix.is_empty() {
        Err("prefix cannot be empty")
    } else if prefix.chars().count() > MAX_PREFIX_LEN {
        Err("prefix is too long")
    } else if prefix.chars().any(char::is_whitespace) {
        Err("prefix cannot contain whitespace")
    } else {
        Ok(())
    }
}

/// Truncates a string to a maximum number of characters with ellipsis.
pub fn truncate_string(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        input.to_string()
    } else {
        let kept: String = input.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::seconds(42)), "42s");
        assert_eq!(format_duration(Duration::seconds(125)), "2m 5s");
        assert_eq!(format_duration(Duration::minutes(61)), "1h 1m");
        assert_eq!(format_duration(Duration::hours(49)), "2d 1h 0m");
        assert_eq!(format_duration(Duration::seconds(-5)), "0s");
    }

    #[test]
    fn test_validate_prefix() {
        assert!(validate_prefix(".").is_ok());
        assert!(validate_prefix("m!").is_ok());
        assert_eq!(validate_prefix(""), Err("prefix cannot be empty"));
        assert_eq!(validate_prefix("a b"), Err("prefix cannot contain whitespace"));
        assert_eq!(validate_prefix(&"x".repeat(17)), Err("prefix is too long"));
    }

    #[test]
    fn test_truncate_string() {
        let input = "This is a very long string that should be truncated";
        assert_eq!(truncate_string(input, 20), "This is a very lo...");
        assert_eq!(truncate_string("Short", 20), "Short");
        assert_eq!(truncate_string("ééééé", 4), "é...");
    }
}
