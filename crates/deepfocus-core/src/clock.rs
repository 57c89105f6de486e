//! Wall-clock helpers.
//!
//! Everything time-dependent in the core takes an absolute epoch-millisecond
//! `now` as an argument. These helpers are only used at the edges (CLI,
//! daemon) to produce that value, and to map it onto the local calendar.

use chrono::{Local, NaiveDate, TimeZone};

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

/// The local calendar date an epoch-millisecond timestamp falls on.
pub fn local_date(epoch_ms: i64) -> NaiveDate {
    Local
        .timestamp_millis_opt(epoch_ms)
        .earliest()
        .map(|dt| dt.date_naive())
        .unwrap_or_else(|| Local::now().date_naive())
}
