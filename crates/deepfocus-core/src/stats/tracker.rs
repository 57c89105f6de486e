//! Store-level bookkeeping for the daily counters and the analytics window.
//!
//! Each mutation is a read-modify-write through [`StoreExt::modify_with`], so
//! a tab switch and a pomodoro completion landing together cannot overwrite
//! each other. `dailyStats` and `analyticsData` are separate keys and are
//! updated in two steps.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::analytics::AnalyticsData;
use super::daily::DailyStats;
use crate::error::StoreError;
use crate::events::Event;
use crate::storage::{keys, Store, StoreExt};
use crate::timer::Session;

/// Answer to `getStats` and payload of `statsUpdate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub daily_stats: DailyStats,
    pub analytics_data: AnalyticsData,
    pub focus_score: u8,
}

impl StatsSnapshot {
    pub fn new(daily_stats: DailyStats, analytics_data: AnalyticsData) -> Self {
        let focus_score = daily_stats.focus_score();
        Self {
            daily_stats,
            analytics_data,
            focus_score,
        }
    }

    pub fn to_event(&self) -> Event {
        Event::StatsUpdate {
            stats: self.daily_stats.clone(),
            analytics: self.analytics_data.clone(),
            focus_score: self.focus_score,
        }
    }
}

/// Current counters plus the analytics window rolled to `today`.
///
/// Read-only: the rolled window is not written back.
pub fn load(store: &dyn Store, today: NaiveDate) -> Result<StatsSnapshot, StoreError> {
    let daily = store.read::<DailyStats>(keys::DAILY_STATS)?.unwrap_or_default();
    let mut analytics = store
        .read::<AnalyticsData>(keys::ANALYTICS_DATA)?
        .unwrap_or_else(|| AnalyticsData::new(today));
    analytics.roll_to(today);
    Ok(StatsSnapshot::new(daily, analytics))
}

/// Apply the debounced tab-switch rule. `None` when the switch was
/// suppressed.
pub fn record_tab_switch(
    store: &dyn Store,
    at_ms: i64,
    debounce_ms: i64,
    today: NaiveDate,
) -> Result<Option<StatsSnapshot>, StoreError> {
    let mut counted = false;
    let daily = store.modify(keys::DAILY_STATS, |stats: &mut DailyStats| {
        counted = stats.record_tab_switch(at_ms, debounce_ms);
    })?;
    if !counted {
        return Ok(None);
    }
    let analytics = modify_analytics(store, today, |a| a.record_day(today, &daily))?;
    Ok(Some(StatsSnapshot::new(daily, analytics)))
}

/// Count a distraction. Blocklist hits also land in the blocked-sites
/// history.
pub fn record_distraction(
    store: &dyn Store,
    today: NaiveDate,
    blocked_site: bool,
) -> Result<StatsSnapshot, StoreError> {
    let daily = store.modify(keys::DAILY_STATS, |stats: &mut DailyStats| {
        stats.record_distraction();
    })?;
    let analytics = modify_analytics(store, today, |a| {
        if blocked_site {
            a.record_blocked_attempt(today);
        }
        a.record_day(today, &daily);
    })?;
    Ok(StatsSnapshot::new(daily, analytics))
}

/// Bookkeeping for a finished work phase.
pub fn record_completed_pomodoro(
    store: &dyn Store,
    work_minutes: u32,
    today: NaiveDate,
) -> Result<StatsSnapshot, StoreError> {
    let daily = store.modify(keys::DAILY_STATS, |stats: &mut DailyStats| {
        stats.record_pomodoro(work_minutes);
    })?;
    let analytics = modify_analytics(store, today, |a| {
        a.record_focus(today, work_minutes);
        a.record_day(today, &daily);
    })?;
    Ok(StatsSnapshot::new(daily, analytics))
}

/// Zero the daily counters. The analytics history is not touched.
pub fn reset_daily(store: &dyn Store) -> Result<DailyStats, StoreError> {
    store.modify(keys::DAILY_STATS, |stats: &mut DailyStats| stats.reset())
}

/// Keep the `pomodoroActive` / `currentSession` mirror inside `dailyStats`
/// in step with the timer.
pub fn mirror_session(store: &dyn Store, session: Option<&Session>) -> Result<(), StoreError> {
    store.modify(keys::DAILY_STATS, |stats: &mut DailyStats| {
        stats.pomodoro_active = session.is_some();
        stats.current_session = session.cloned();
    })?;
    Ok(())
}

fn modify_analytics<F>(store: &dyn Store, today: NaiveDate, f: F) -> Result<AnalyticsData, StoreError>
where
    F: FnOnce(&mut AnalyticsData),
{
    store.modify_with(keys::ANALYTICS_DATA, || AnalyticsData::new(today), f)
}
