//! Daily reset at local midnight.
//!
//! The reset is driven by a coarse, minute-granular poll. If no poll lands in
//! the 00:00 minute that day is simply not reset.

use chrono::{DateTime, NaiveDate, TimeZone, Timelike};

/// True during the first minute of the local day.
pub fn is_daily_reset_due<Tz: TimeZone>(now: &DateTime<Tz>) -> bool {
    now.hour() == 0 && now.minute() == 0
}

/// Remembers which day was already reset so that two polls landing in the
/// same midnight minute only reset once.
#[derive(Debug, Clone, Default)]
pub struct DailyResetPoller {
    last_reset: Option<NaiveDate>,
}

impl DailyResetPoller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the caller should reset the daily counters now.
    pub fn poll<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> bool {
        if !is_daily_reset_due(now) {
            return false;
        }
        let today = now.date_naive();
        if self.last_reset == Some(today) {
            return false;
        }
        self.last_reset = Some(today);
        true
    }

    pub fn last_reset(&self) -> Option<NaiveDate> {
        self.last_reset
    }
}
