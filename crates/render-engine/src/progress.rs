//! Parsing of ffmpeg `-progress` output.
//!
//! ffmpeg writes blocks of `key=value` lines. Only the elapsed output time
//! matters here; it arrives as `out_time_ms` (integer microseconds, despite
//! the name) and as `out_time` (`HH:MM:SS.ffffff`).

/// Extract elapsed output seconds from one progress line.
///
/// Returns `None` for unrelated keys and for values that do not parse,
/// such as `N/A` before the first frame is written.
pub fn parse_progress_line(line: &str) -> Option<f64> {
    let (key, value) = line.trim().split_once('=')?;
    let value = value.trim();

    match key.trim() {
        "out_time_ms" => value.parse::<i64>().ok().map(|us| us as f64 / 1_000_000.0),
        "out_time" => parse_timecode(value),
        _ => None,
    }
}

/// Parse `HH:MM:SS[.ffffff]` into seconds.
///
/// The fractional part is a decimal fraction of a second, so `07.5` is
/// seven and a half seconds. A leading minus applies to the whole value.
pub fn parse_timecode(value: &str) -> Option<f64> {
    let (negative, value) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value),
    };

    let mut parts = value.split(':');
    let hours = parts.next()?.parse::<u64>().ok()?;
    let minutes = parts.next()?.parse::<u64>().ok()?;
    let seconds_part = parts.next()?;
    if parts.next().is_some() || !seconds_part.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    let seconds = seconds_part.parse::<f64>().ok()?;
    if !seconds.is_finite() {
        return None;
    }

    let whole = hours.checked_mul(3600)?.checked_add(minutes.checked_mul(60)?)?;
    let total = whole as f64 + seconds;
    Some(if negative { -total } else { total })
}

/// Convert elapsed seconds to a percentage of `duration`, clamped to 0..=100.
///
/// A non-positive duration yields 0.
pub fn percent(elapsed_secs: f64, duration_secs: f64) -> f64 {
    if duration_secs <= 0.0 || !duration_secs.is_finite() {
        return 0.0;
    }
    (100.0 * elapsed_secs / duration_secs).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_time_ms_is_microseconds() {
        let elapsed = parse_progress_line("out_time_ms=5000000").unwrap();
        assert!((percent(elapsed, 10.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_out_time_timecode() {
        let elapsed = parse_progress_line("out_time=00:00:07.500000").unwrap();
        assert!((percent(elapsed, 10.0) - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_duration_yields_zero() {
        let elapsed = parse_progress_line("out_time_ms=5000000").unwrap();
        assert_eq!(percent(elapsed, 0.0), 0.0);
        assert_eq!(percent(elapsed, -1.0), 0.0);
    }

    #[test]
    fn test_timecode_fraction_is_decimal() {
        assert_eq!(parse_timecode("00:00:07.5"), Some(7.5));
        assert_eq!(parse_timecode("01:02:03"), Some(3723.0));
        assert!((parse_timecode("00:00:00.000001").unwrap() - 0.000001).abs() < 1e-12);
    }

    #[test]
    fn test_ignores_other_keys() {
        assert_eq!(parse_progress_line("frame=120"), None);
        assert_eq!(parse_progress_line("out_time_us=5000000"), None);
        assert_eq!(parse_progress_line("progress=continue"), None);
        assert_eq!(parse_progress_line("no separator"), None);
    }

    #[test]
    fn test_unparseable_values_are_skipped() {
        assert_eq!(parse_progress_line("out_time_ms=N/A"), None);
        assert_eq!(parse_progress_line("out_time=N/A"), None);
        assert_eq!(parse_timecode("00:07.5"), None);
        assert_eq!(parse_timecode("00:00:07:00"), None);
    }

    #[test]
    fn test_oversized_timecode_is_skipped() {
        assert_eq!(parse_progress_line("out_time=9999999999999999:00:00.000000"), None);
        assert_eq!(parse_timecode("00:9999999999999999999:00"), None);
        assert_eq!(parse_timecode("18446744073709551615:00:00"), None);
        assert_eq!(parse_timecode("100:00:00.000000"), Some(360_000.0));
    }

    #[test]
    fn test_negative_start_clamps_to_zero() {
        let elapsed = parse_progress_line("out_time=-00:00:00.040000").unwrap();
        assert!(elapsed < 0.0);
        assert_eq!(percent(elapsed, 10.0), 0.0);
    }

    #[test]
    fn test_percent_clamps_overshoot() {
        assert_eq!(percent(10.04, 10.0), 100.0);
    }
}
