//! Data model: stored readings and the derived snapshot payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One temperature observation as stored in the `temperatures` table.
///
/// `id` is server-assigned (`SERIAL`) and monotonically increasing;
/// `updated_at` is set by the write path, never by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reading {
    /// Stable row identity, default sort key (descending)
    pub id: i32,
    /// Non-empty city label
    pub city: String,
    /// Observed temperature in °C; always finite
    pub temperature: f64,
    /// Timestamp of the last mutation
    pub updated_at: DateTime<Utc>,
}

/// Aggregate statistics over the current reading set.
///
/// Derived on demand, never persisted. Aggregates are formatted to two
/// decimals for display consistency; an empty table yields `"0.00"`
/// everywhere rather than null so client consumers stay well-defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: i64,
    pub average: String,
    pub min: String,
    pub max: String,
}

impl Summary {
    /// The empty-table summary: zero count, all aggregates `"0.00"`.
    pub fn empty() -> Self {
        Self {
            count: 0,
            average: format_temp(0.0),
            min: format_temp(0.0),
            max: format_temp(0.0),
        }
    }

    /// Build a summary from raw aggregates.
    pub fn from_aggregates(count: i64, average: f64, min: f64, max: f64) -> Self {
        Self {
            count,
            average: format_temp(average),
            min: format_temp(min),
            max: format_temp(max),
        }
    }
}

/// Full current state pushed to live subscribers: summary plus the
/// ordered reading list (descending by id). Immutable once built; one
/// snapshot is shared read-only across all subscribers of a broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub summary: Summary,
    pub list: Vec<Reading>,
}

/// Format a temperature aggregate to fixed two-decimal precision.
pub fn format_temp(value: f64) -> String {
    format!("{:.2}", value)
}
