//! KPI summary statistics.

use serde::Serialize;

use crate::format::serialize_one_decimal;
use crate::types::InteractionRecord;

/// Headline numbers shown on the dashboard cards.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    /// Number of interactions
    pub total_users: usize,
    /// Interactions explicitly marked finished
    pub conversions: usize,
    /// conversions / total_users * 100, 0 for an empty set
    #[serde(serialize_with = "serialize_one_decimal")]
    pub conversion_rate: f64,
    /// Interactions explicitly marked talking
    pub currently_talking: usize,
    /// Mean message count over rows that report one
    #[serde(serialize_with = "serialize_one_decimal")]
    pub avg_messages: f64,
}

/// Compute summary statistics over the full record set.
///
/// Missing `message_count` values are left out of the average entirely
/// rather than counted as zero.
pub fn summarize(records: &[InteractionRecord]) -> SummaryStats {
    let total_users = records.len();
    let conversions = records.iter().filter(|r| r.is_conversion()).count();
    let currently_talking = records.iter().filter(|r| r.is_active()).count();

    let conversion_rate = if total_users > 0 {
        conversions as f64 / total_users as f64 * 100.0
    } else {
        0.0
    };

    let (message_sum, reporting) = records
        .iter()
        .filter_map(|r| r.message_count)
        .fold((0f64, 0usize), |(sum, n), count| (sum + count as f64, n + 1));
    let avg_messages = if reporting > 0 {
        message_sum / reporting as f64
    } else {
        0.0
    };

    SummaryStats {
        total_users,
        conversions,
        conversion_rate,
        currently_talking,
        avg_messages,
    }
}
