// Utility functions
use chrono::{DateTime, NaiveDate};

pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Calendar date (UTC) of an epoch-millisecond timestamp.
pub fn date_from_millis(timestamp: i64) -> NaiveDate {
    DateTime::from_timestamp_millis(timestamp)
        .map(|dt| dt.date_naive())
        .unwrap_or_default()
}

/// Whole days between two timestamps, rounded towards negative infinity.
pub fn days_between(from: i64, to: i64) -> i64 {
    (to - from).div_euclid(DAY_MS)
}
