//! Names of the persisted store keys shared by every context.

pub const DAILY_STATS: &str = "dailyStats";
pub const ANALYTICS_DATA: &str = "analyticsData";
pub const BLOCKED_SITES: &str = "blockedSites";
pub const BLOCKING_RULES: &str = "blockingRules";
pub const CUSTOM_FILTERS: &str = "customFilters";

pub const FOCUS_MODE: &str = "focusMode";
pub const DIMMING_LEVEL: &str = "dimmingLevel";
pub const GRAY_MODE: &str = "grayMode";
pub const FILTER_LEVEL: &str = "filterLevel";
pub const SOUNDSCAPE: &str = "soundscape";
pub const WORK_DURATION: &str = "workDuration";
pub const BREAK_DURATION: &str = "breakDuration";

pub const POMODORO_ACTIVE: &str = "pomodoroActive";
pub const POMODORO_END_TIME: &str = "pomodoroEndTime";
pub const CURRENT_SESSION: &str = "currentSession";
