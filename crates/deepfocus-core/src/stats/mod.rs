//! Statistics module for DeepFocus
//!
//! Daily distraction counters, the derived focus score, the seven-day
//! analytics window and the midnight reset.

mod analytics;
mod daily;
mod reset;
mod score;
pub mod tracker;

pub use analytics::{AnalyticsData, DashboardSummary, TODAY, WINDOW_DAYS};
pub use daily::{DailyStats, TAB_SWITCH_DEBOUNCE_MS};
pub use reset::{is_daily_reset_due, DailyResetPoller};
pub use score::{focus_score, BASE_SCORE, DISTRACTION_PENALTY, TAB_SWITCH_PENALTY};
pub use tracker::StatsSnapshot;
