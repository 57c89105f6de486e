use serde::{Deserialize, Serialize};

pub const MS_PER_MINUTE: i64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Working,
    OnBreak,
}

impl Phase {
    pub fn is_break(self) -> bool {
        self == Phase::OnBreak
    }

    pub fn next(self) -> Self {
        match self {
            Phase::Working => Phase::OnBreak,
            Phase::OnBreak => Phase::Working,
        }
    }
}

/// One active work-or-break interval.
///
/// Only absolute timestamps are stored. Remaining time is always
/// `end_time - now`, so a session read back after the engine was torn down
/// is exactly as valid as the one in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Epoch ms.
    pub start_time: i64,
    /// Phase length in ms.
    pub duration: i64,
    pub is_break: bool,
    /// Epoch ms.
    pub end_time: i64,
    /// Minutes.
    pub work_duration: u32,
    /// Minutes.
    pub break_duration: u32,
}

impl Session {
    pub fn begin(phase: Phase, work_duration: u32, break_duration: u32, now_ms: i64) -> Self {
        let minutes = match phase {
            Phase::Working => work_duration,
            Phase::OnBreak => break_duration,
        };
        let duration = i64::from(minutes) * MS_PER_MINUTE;
        Self {
            start_time: now_ms,
            duration,
            is_break: phase.is_break(),
            end_time: now_ms + duration,
            work_duration,
            break_duration,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.is_break {
            Phase::OnBreak
        } else {
            Phase::Working
        }
    }

    /// May be zero or negative once the phase is over.
    pub fn remaining_ms(&self, now_ms: i64) -> i64 {
        self.end_time - now_ms
    }

    pub fn is_complete(&self, now_ms: i64) -> bool {
        self.remaining_ms(now_ms) <= 0
    }

    /// The session that follows this one, starting at `now_ms`.
    pub fn next(&self, now_ms: i64) -> Self {
        Self::begin(
            self.phase().next(),
            self.work_duration,
            self.break_duration,
            now_ms,
        )
    }
}
