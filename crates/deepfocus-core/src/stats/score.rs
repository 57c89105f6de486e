//! Focus score.
//!
//! A pure function of the day's counters. It is recomputed whenever it is
//! shown and never stored on its own.

pub const BASE_SCORE: i64 = 100;
pub const TAB_SWITCH_PENALTY: i64 = 2;
pub const DISTRACTION_PENALTY: i64 = 5;

/// `clamp(100 - 2 * tab_switches - 5 * distractions, 0, 100)`.
pub fn focus_score(tab_switches: u32, distractions: u32) -> u8 {
    let score = BASE_SCORE
        - i64::from(tab_switches) * TAB_SWITCH_PENALTY
        - i64::from(distractions) * DISTRACTION_PENALTY;
    score.clamp(0, BASE_SCORE) as u8
}
