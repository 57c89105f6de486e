//! Seven-day rolling analytics window.
//!
//! Every history array has exactly [`WINDOW_DAYS`] slots ordered oldest to
//! newest; the last slot is today. The fixed-size arrays make the length
//! invariant a property of the type.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::daily::DailyStats;

pub const WINDOW_DAYS: usize = 7;
pub const TODAY: usize = WINDOW_DAYS - 1;

/// Score assumed for days with no activity.
const EMPTY_DAY_SCORE: u8 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsData {
    /// Focus minutes per day.
    pub focus_history: [u32; WINDOW_DAYS],
    pub score_history: [u8; WINDOW_DAYS],
    pub distraction_history: [u32; WINDOW_DAYS],
    pub blocked_sites_history: [u32; WINDOW_DAYS],
    /// Short weekday labels ("Mon") aligned with the history slots.
    pub dates: [String; WINDOW_DAYS],
    /// Date the last slot refers to.
    #[serde(default)]
    pub last_updated: Option<NaiveDate>,
}

/// Aggregates shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_focus_hours: u32,
    pub average_focus_score: u32,
    pub total_pomodoros: u32,
    pub distractions_avoided: u32,
}

impl AnalyticsData {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            focus_history: [0; WINDOW_DAYS],
            score_history: [EMPTY_DAY_SCORE; WINDOW_DAYS],
            distraction_history: [0; WINDOW_DAYS],
            blocked_sites_history: [0; WINDOW_DAYS],
            dates: day_labels(today),
            last_updated: Some(today),
        }
    }

    /// Slide the window so the last slot is `today`.
    ///
    /// Days skipped while nothing ran get empty slots. A clock that moved
    /// backwards leaves the data alone.
    pub fn roll_to(&mut self, today: NaiveDate) {
        let Some(last) = self.last_updated else {
            self.dates = day_labels(today);
            self.last_updated = Some(today);
            return;
        };

        let elapsed = (today - last).num_days();
        if elapsed <= 0 {
            return;
        }

        let shift = (elapsed as usize).min(WINDOW_DAYS);
        shift_left(&mut self.focus_history, shift, 0);
        shift_left(&mut self.score_history, shift, EMPTY_DAY_SCORE);
        shift_left(&mut self.distraction_history, shift, 0);
        shift_left(&mut self.blocked_sites_history, shift, 0);
        self.dates = day_labels(today);
        self.last_updated = Some(today);
    }

    pub fn record_focus(&mut self, today: NaiveDate, minutes: u32) {
        self.roll_to(today);
        self.focus_history[TODAY] = self.focus_history[TODAY].saturating_add(minutes);
    }

    pub fn record_blocked_attempt(&mut self, today: NaiveDate) {
        self.roll_to(today);
        self.blocked_sites_history[TODAY] = self.blocked_sites_history[TODAY].saturating_add(1);
    }

    /// Mirror today's score and distraction count from the daily counters.
    pub fn record_day(&mut self, today: NaiveDate, stats: &DailyStats) {
        self.roll_to(today);
        self.score_history[TODAY] = stats.focus_score();
        self.distraction_history[TODAY] = stats.distractions;
    }

    pub fn summary(&self, stats: &DailyStats) -> DashboardSummary {
        let total_focus_min: u32 = self.focus_history.iter().sum();
        let score_sum: u32 = self.score_history.iter().map(|s| u32::from(*s)).sum();
        DashboardSummary {
            total_focus_hours: (f64::from(total_focus_min) / 60.0).round() as u32,
            average_focus_score: (f64::from(score_sum) / WINDOW_DAYS as f64).round() as u32,
            total_pomodoros: stats.pomodoros_completed,
            distractions_avoided: self.blocked_sites_history.iter().sum(),
        }
    }
}

fn shift_left<T: Copy>(slots: &mut [T; WINDOW_DAYS], by: usize, fill: T) {
    slots.rotate_left(by % WINDOW_DAYS);
    for slot in slots.iter_mut().skip(WINDOW_DAYS - by) {
        *slot = fill;
    }
}

fn day_labels(today: NaiveDate) -> [String; WINDOW_DAYS] {
    std::array::from_fn(|i| {
        let back = (TODAY - i) as i64;
        (today - Duration::days(back)).format("%a").to_string()
    })
}
