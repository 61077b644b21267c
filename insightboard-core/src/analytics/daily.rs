//! Daily time series.
//!
//! Timestamps are bucketed by calendar date in a configurable display time
//! zone. Only days with at least one qualifying record get a bucket, and the
//! series keeps the most recent `window` buckets in ascending date order.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::InteractionRecord;

/// Default number of days kept in a series.
pub const DEFAULT_SERIES_DAYS: usize = 30;

/// Time zone that decides which calendar day a timestamp belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum DayBoundary {
    /// The machine's local time zone
    #[default]
    Local,
    Utc,
    /// A fixed offset such as `-03:00`
    Fixed(FixedOffset),
}

impl DayBoundary {
    /// Calendar date of `ts` in this time zone.
    pub fn date_of(&self, ts: DateTime<Utc>) -> NaiveDate {
        match self {
            DayBoundary::Local => ts.with_timezone(&Local).date_naive(),
            DayBoundary::Utc => ts.date_naive(),
            DayBoundary::Fixed(offset) => ts.with_timezone(offset).date_naive(),
        }
    }
}

impl FromStr for DayBoundary {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "local" => return Ok(DayBoundary::Local),
            "utc" | "z" => return Ok(DayBoundary::Utc),
            _ => {}
        }

        let invalid = || format!("invalid day boundary '{}': use local, utc or ±HH:MM", s);

        let (sign, rest) = match s.as_bytes().first() {
            Some(b'+') => (1, &s[1..]),
            Some(b'-') => (-1, &s[1..]),
            _ => return Err(invalid()),
        };
        let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
        let hours: i32 = hours.parse().map_err(|_| invalid())?;
        let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
        if !(0..=23).contains(&hours) || !(0..=59).contains(&minutes) {
            return Err(invalid());
        }

        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(DayBoundary::Fixed)
            .ok_or_else(invalid)
    }
}

impl TryFrom<String> for DayBoundary {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for DayBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayBoundary::Local => write!(f, "local"),
            DayBoundary::Utc => write!(f, "utc"),
            DayBoundary::Fixed(offset) => write!(f, "{}", offset),
        }
    }
}

/// What each daily bucket accumulates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeriesKind {
    /// +1 for every record
    Interactions,
    /// +1 for every converted record
    Conversions,
    /// + `per_conversion` for every converted record
    Revenue { per_conversion: f64 },
}

impl SeriesKind {
    /// Contribution of one record to its day's bucket, if any.
    fn contribution(&self, record: &InteractionRecord) -> Option<f64> {
        match self {
            SeriesKind::Interactions => Some(1.0),
            SeriesKind::Conversions => record.is_conversion().then_some(1.0),
            SeriesKind::Revenue { per_conversion } => {
                record.is_conversion().then_some(*per_conversion)
            }
        }
    }
}

/// One day of a series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Group records into daily buckets.
///
/// Returns at most `window` points, the most recent ones, ascending by date.
pub fn daily_series(
    records: &[InteractionRecord],
    kind: SeriesKind,
    boundary: DayBoundary,
    window: usize,
) -> Vec<DailyPoint> {
    let mut buckets: BTreeMap<NaiveDate, f64> = BTreeMap::new();

    for record in records {
        if let Some(amount) = kind.contribution(record) {
            *buckets.entry(boundary.date_of(record.created_at)).or_insert(0.0) += amount;
        }
    }

    let skip = buckets.len().saturating_sub(window);
    buckets
        .into_iter()
        .skip(skip)
        .map(|(date, value)| DailyPoint { date, value })
        .collect()
}
