mod engine;
mod session;

pub use engine::{status, PomodoroUpdate, TimerEngine, TimerState, TimerStatus, DEFAULT_WORK_MINUTES};
pub use session::{Phase, Session, MS_PER_MINUTE};
