//! Property tests for the focus score and the tab-switch debounce.

use deepfocus_core::stats::{focus_score, AnalyticsData, TODAY, WINDOW_DAYS};
use deepfocus_core::DailyStats;
use proptest::prelude::*;

proptest! {
    #[test]
    fn score_stays_in_range(t in any::<u32>(), d in any::<u32>()) {
        let score = focus_score(t, d);
        prop_assert!(score <= 100);
    }

    #[test]
    fn score_never_rises_with_more_activity(t in 0u32..200, d in 0u32..200) {
        let base = focus_score(t, d);
        prop_assert!(focus_score(t + 1, d) <= base);
        prop_assert!(focus_score(t, d + 1) <= base);
    }

    #[test]
    fn score_matches_formula_above_floor(t in 0u32..20, d in 0u32..8) {
        let expected = 100 - 2 * i64::from(t) - 5 * i64::from(d);
        prop_assume!(expected >= 0);
        prop_assert_eq!(i64::from(focus_score(t, d)), expected);
    }

    #[test]
    fn counted_switches_are_spaced_beyond_debounce(
        gaps in proptest::collection::vec(0i64..3000, 1..50),
    ) {
        let mut stats = DailyStats::default();
        let mut at = 0i64;
        let mut counted_at = Vec::new();
        for gap in gaps {
            at += gap;
            if stats.record_tab_switch(at, 1000) {
                counted_at.push(at);
            }
        }
        prop_assert_eq!(stats.tab_switches as usize, counted_at.len());
        prop_assert_eq!(stats.distractions, stats.tab_switches);
        for pair in counted_at.windows(2) {
            prop_assert!(pair[1] - pair[0] > 1000);
        }
    }

    #[test]
    fn rolling_moves_focus_towards_the_oldest_slot(days in 0usize..30) {
        let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut data = AnalyticsData::new(start);
        data.record_focus(start, 25);
        data.roll_to(start + chrono::Duration::days(days as i64));

        let total: u32 = data.focus_history.iter().sum();
        if days < WINDOW_DAYS {
            prop_assert_eq!(total, 25);
            prop_assert_eq!(data.focus_history[TODAY - days], 25);
        } else {
            prop_assert_eq!(total, 0);
        }
    }
}

#[test]
fn test_score_examples() {
    assert_eq!(focus_score(0, 0), 100);
    assert_eq!(focus_score(5, 2), 80);
    assert_eq!(focus_score(100, 100), 0);
}
