//! Time and number formatting for ffmpeg arguments and console output

/// Format a number for an ffmpeg argument: fixed precision, trailing zeros trimmed
///
/// `1.5` becomes `"1.5"`, `-30.0` becomes `"-30"`, `0.1 + 0.2` becomes `"0.3"`.
pub fn format_decimal(value: f64) -> String {
    let text = format!("{:.6}", value);
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "" | "-" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Format seconds as `HH:MM:SS.mmm` (hours omitted when zero)
pub fn format_timestamp(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
    } else {
        format!("{:02}:{:02}.{:03}", minutes, secs, millis)
    }
}
