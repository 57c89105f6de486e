use serde::{Deserialize, Serialize};

use super::score::focus_score;
use crate::timer::Session;

/// Default debounce window for tab switches, in milliseconds.
pub const TAB_SWITCH_DEBOUNCE_MS: i64 = 1000;

/// Counters for the current calendar day.
///
/// Several handlers mutate this independently (tab switches, blocklist hits,
/// pomodoro completions); it is zeroed once a day by the reset poll.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DailyStats {
    /// Completed focus minutes.
    pub focus_time: u32,
    pub tab_switches: u32,
    pub pomodoros_completed: u32,
    pub distractions: u32,
    pub pomodoro_active: bool,
    pub current_session: Option<Session>,
    /// Epoch ms of the last *counted* tab switch.
    pub last_tab_switch: Option<i64>,
}

impl DailyStats {
    pub fn focus_score(&self) -> u8 {
        focus_score(self.tab_switches, self.distractions)
    }

    /// Count a tab switch unless it lands within `debounce_ms` of the last
    /// counted one. A counted switch is also a distraction.
    pub fn record_tab_switch(&mut self, at_ms: i64, debounce_ms: i64) -> bool {
        if let Some(last) = self.last_tab_switch {
            if at_ms.saturating_sub(last) <= debounce_ms {
                return false;
            }
        }
        self.tab_switches = self.tab_switches.saturating_add(1);
        self.distractions = self.distractions.saturating_add(1);
        self.last_tab_switch = Some(at_ms);
        true
    }

    pub fn record_distraction(&mut self) {
        self.distractions = self.distractions.saturating_add(1);
    }

    pub fn record_pomodoro(&mut self, work_minutes: u32) {
        self.pomodoros_completed = self.pomodoros_completed.saturating_add(1);
        self.focus_time = self.focus_time.saturating_add(work_minutes);
    }

    /// Zero the day's counters. The pomodoro mirror fields describe the
    /// running timer, not the day, so they are kept.
    pub fn reset(&mut self) {
        self.focus_time = 0;
        self.tab_switches = 0;
        self.pomodoros_completed = 0;
        self.distractions = 0;
        self.last_tab_switch = None;
    }
}
