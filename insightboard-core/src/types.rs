//! Core domain types for insightboard
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Interaction** | One tracked conversation with one customer (one backend row) |
//! | **Stage** | The customer's current step in the sales funnel |
//! | **Conversion** | An interaction whose `finish` flag is set |
//! | **Talking** | An interaction whose session is currently active |
//!
//! Field names follow the dashboard's vocabulary; serde renames map them to
//! the backend's column names (`whatsapp`, `message_id`, `finish`, ...).
//!
//! Optional fields mean "unknown". They are never coerced to zero or false;
//! each metric decides explicitly how to treat a missing value.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One row per tracked conversation/customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    /// Unique row identity (0 when the projection did not include it)
    #[serde(default)]
    pub id: i64,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// External contact handle
    #[serde(default, rename = "whatsapp")]
    pub contact: Option<String>,
    /// Last message body
    #[serde(default, rename = "messages")]
    pub message_text: Option<String>,
    /// Number of messages exchanged so far
    #[serde(default, rename = "message_id")]
    pub message_count: Option<i64>,
    /// Creation instant, used for all time bucketing
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    /// True while the session is active
    #[serde(default, rename = "talking")]
    pub is_talking: Option<bool>,
    /// Current funnel stage key
    #[serde(default)]
    pub stage: Option<String>,
    /// Last inbound message
    #[serde(default, rename = "prev_msg")]
    pub previous_message: Option<String>,
    /// True when the interaction ended in conversion
    #[serde(default, rename = "finish")]
    pub is_finished: Option<bool>,
}

impl InteractionRecord {
    /// Minimal record with only the required fields set.
    pub fn new(id: i64, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: None,
            contact: None,
            message_text: None,
            message_count: None,
            created_at,
            is_talking: None,
            stage: None,
            previous_message: None,
            is_finished: None,
        }
    }

    /// Counts as a conversion only when explicitly finished.
    pub fn is_conversion(&self) -> bool {
        self.is_finished == Some(true)
    }

    /// Counts as active only when explicitly talking.
    pub fn is_active(&self) -> bool {
        self.is_talking == Some(true)
    }
}

/// Parse a backend timestamp.
///
/// Accepts RFC 3339 (`timestamptz` columns) and naive ISO timestamps
/// (`timestamp` columns), the latter interpreted as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    // PostgREST renders offsets as "+00:00" but some exports drop the 'T'
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid created_at: {raw}")))
}
