use serde::{Deserialize, Serialize};

use crate::focus::FilterLevel;
use crate::stats::{AnalyticsData, DailyStats};
use crate::timer::PomodoroUpdate;

/// Every broadcast produced by the engine or the focus controls.
///
/// The wire shape is `{"type": "<camelCase name>", ...fields}` so listeners
/// in any context can dispatch on `type` alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Event {
    /// Remaining time of the active phase, sent on every tick and transition.
    PomodoroUpdate(PomodoroUpdate),
    #[serde(rename_all = "camelCase")]
    StatsUpdate {
        stats: DailyStats,
        analytics: AnalyticsData,
        focus_score: u8,
    },
    ToggleFocusMode {
        enabled: bool,
    },
    ToggleGrayMode {
        enabled: bool,
    },
    UpdateDimming {
        level: u8,
    },
    SetFilterLevel {
        level: FilterLevel,
    },
    FilterElementAtPoint {
        x: f64,
        y: f64,
    },
    /// Switch the ambient sound. `asset` is `None` for `"none"`, which stops
    /// playback.
    #[serde(rename_all = "camelCase")]
    HandleSound {
        sound_type: String,
        asset: Option<String>,
    },
}

impl Event {
    /// Wire name of the event (`type` field).
    pub fn name(&self) -> &'static str {
        match self {
            Event::PomodoroUpdate(_) => "pomodoroUpdate",
            Event::StatsUpdate { .. } => "statsUpdate",
            Event::ToggleFocusMode { .. } => "toggleFocusMode",
            Event::ToggleGrayMode { .. } => "toggleGrayMode",
            Event::UpdateDimming { .. } => "updateDimming",
            Event::SetFilterLevel { .. } => "setFilterLevel",
            Event::FilterElementAtPoint { .. } => "filterElementAtPoint",
            Event::HandleSound { .. } => "handleSound",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pomodoro_update_wire_shape() {
        let event = Event::PomodoroUpdate(PomodoroUpdate {
            is_break: false,
            time_remaining: 1,
            duration: 1_500_000,
        });
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"type": "pomodoroUpdate", "isBreak": false, "timeRemaining": 1, "duration": 1_500_000})
        );
    }

    #[test]
    fn page_messages_use_camel_case_names() {
        let event = Event::SetFilterLevel {
            level: FilterLevel::Moderate,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "setFilterLevel");
        assert_eq!(json["level"], "moderate");
        assert_eq!(event.name(), "setFilterLevel");
    }

    #[test]
    fn sound_switch_carries_type_and_asset() {
        let event = Event::HandleSound {
            sound_type: "none".into(),
            asset: None,
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"type": "handleSound", "soundType": "none", "asset": null})
        );
        assert_eq!(event.name(), "handleSound");
    }
}
