//! Formatting helpers shared by the views and the CLI.

use chrono::{DateTime, Utc};
use serde::Serializer;

/// Render a value with exactly one decimal digit (e.g., "68.3").
///
/// Halves round away from zero, so 2.25 renders as "2.3".
pub fn format_one_decimal(value: f64) -> String {
    format!("{:.1}", round1(value))
}

/// Serde adapter rendering an `f64` as a one-decimal string.
pub fn serialize_one_decimal<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_one_decimal(*value))
}

/// Round to one decimal place, halves away from zero.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Format a timestamp relative to `now` (e.g., "2m ago").
pub fn format_relative_time_from(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(ts);

    if duration.num_seconds() < 0 {
        "just now".to_string()
    } else if duration.num_seconds() < 60 {
        format!("{}s ago", duration.num_seconds())
    } else if duration.num_minutes() < 60 {
        format!("{}m ago", duration.num_minutes())
    } else if duration.num_hours() < 24 {
        format!("{}h ago", duration.num_hours())
    } else if duration.num_days() < 7 {
        format!("{}d ago", duration.num_days())
    } else {
        ts.format("%b %d").to_string()
    }
}

/// Format a timestamp as relative time (e.g., "2m ago").
pub fn format_relative_time(ts: DateTime<Utc>) -> String {
    format_relative_time_from(ts, Utc::now())
}

/// Format an optional value, or "-" if missing.
pub fn format_opt<T: std::fmt::Display>(value: Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_format_one_decimal() {
        assert_eq!(format_one_decimal(0.0), "0.0");
        assert_eq!(format_one_decimal(68.333), "68.3");
        assert_eq!(format_one_decimal(100.0), "100.0");
    }

    #[test]
    fn test_format_one_decimal_rounds_halves_up() {
        assert_eq!(format_one_decimal(2.25), "2.3");
        assert_eq!(format_one_decimal(0.05), "0.1");
        assert_eq!(format_one_decimal(12.5), "12.5");
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(70.0), 70.0);
        assert_eq!(round1(33.333_333), 33.3);
        assert_eq!(round1(66.666_666), 66.7);
        assert_eq!(round1(0.0), 0.0);
    }

    #[test]
    fn test_format_relative_time_from() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        assert_eq!(format_relative_time_from(now - Duration::seconds(5), now), "5s ago");
        assert_eq!(format_relative_time_from(now - Duration::minutes(3), now), "3m ago");
        assert_eq!(format_relative_time_from(now - Duration::hours(5), now), "5h ago");
        assert_eq!(format_relative_time_from(now - Duration::days(2), now), "2d ago");
        assert_eq!(format_relative_time_from(now - Duration::days(30), now), "May 11");
        assert_eq!(format_relative_time_from(now + Duration::minutes(1), now), "just now");
    }

    #[test]
    fn test_format_opt() {
        assert_eq!(format_opt(Some(3)), "3");
        assert_eq!(format_opt::<i64>(None), "-");
    }
}
