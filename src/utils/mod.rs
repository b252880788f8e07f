//! Common utilities and helpers

use std::time::Duration;

pub mod time;

/// Display helpers shared by the command handlers
pub struct Utils;

impl Utils {
    /// Format duration for display
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;
        let milliseconds = duration.subsec_millis();

        if hours > 0 {
            format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, milliseconds)
        } else {
            format!("{:02}:{:02}.{:03}", minutes, seconds, milliseconds)
        }
    }

    /// Share of `part` in `total` as a percentage
    pub fn percentage(part: f64, total: f64) -> f64 {
        if total <= 0.0 {
            0.0
        } else {
            (part / total) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(Utils::format_duration(Duration::from_millis(65_250)), "01:05.250");
        assert_eq!(Utils::format_duration(Duration::from_secs(3_661)), "01:01:01.000");
    }

    #[test]
    fn test_percentage() {
        assert_eq!(Utils::percentage(5.0, 10.0), 50.0);
        assert_eq!(Utils::percentage(5.0, 0.0), 0.0);
    }
}
