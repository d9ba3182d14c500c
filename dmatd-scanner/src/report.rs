//! Trigger alerts, the reporting view of a triggered symbol.

use chrono::DateTime;
use dmatd_core::BarResult;
use serde::Serialize;

/// A symbol whose most recent bar triggered an entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerAlert {
    pub symbol: String,
    pub timestamp: i64,
    /// `timestamp` rendered in UTC.
    pub time: String,
    pub close: f64,
}

impl TriggerAlert {
    pub fn new(symbol: &str, bar: &BarResult) -> Self {
        Self {
            symbol: symbol.to_string(),
            timestamp: bar.timestamp,
            time: format_timestamp(bar.timestamp),
            close: bar.close,
        }
    }
}

/// Render epoch seconds as `YYYY-MM-DD HH:MM:SS UTC`.
///
/// Timestamps outside chrono's range fall back to the raw number.
pub fn format_timestamp(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}
