//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()` once a
//! second while a session is active.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Working <-> OnBreak -> Idle
//! ```
//!
//! The persisted [`Session`] is the only state that matters. The engine keeps
//! a cached copy, but refreshes it from the store before acting on it, so an
//! engine that was dropped and rebuilt between two ticks behaves exactly like
//! one that stayed resident.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::restore(store, bus, notifier)?;
//! engine.start(25, 5, now_ms())?;
//! // Once a second:
//! engine.tick(now_ms())?; // Some(update) while active, None when idle
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::session::{Phase, Session, MS_PER_MINUTE};
use crate::bus::Broadcaster;
use crate::clock::local_date;
use crate::error::{Result, StoreError, ValidationError};
use crate::events::Event;
use crate::notify::{Notification, Notifier};
use crate::stats::tracker;
use crate::storage::{keys, Store, StoreExt};

/// Work duration shown by the reset broadcast when nothing else is known.
pub const DEFAULT_WORK_MINUTES: u32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerState {
    Idle,
    Working,
    OnBreak,
}

impl From<Option<&Session>> for TimerState {
    fn from(session: Option<&Session>) -> Self {
        match session.map(Session::phase) {
            None => TimerState::Idle,
            Some(Phase::Working) => TimerState::Working,
            Some(Phase::OnBreak) => TimerState::OnBreak,
        }
    }
}

/// Payload of the `pomodoroUpdate` broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PomodoroUpdate {
    pub is_break: bool,
    /// Milliseconds left in the phase, never negative.
    pub time_remaining: i64,
    /// Phase length in ms.
    pub duration: i64,
}

impl PomodoroUpdate {
    pub fn at(session: &Session, now_ms: i64) -> Self {
        Self {
            is_break: session.is_break,
            time_remaining: session.remaining_ms(now_ms).max(0),
            duration: session.duration,
        }
    }

    /// What listeners show once the timer is stopped.
    pub fn reset(work_minutes: u32) -> Self {
        let duration = i64::from(work_minutes) * MS_PER_MINUTE;
        Self {
            is_break: false,
            time_remaining: duration,
            duration,
        }
    }
}

/// Timer state as any observer can reconstruct it from the store alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerStatus {
    pub state: TimerState,
    pub pomodoro_active: bool,
    pub is_break: bool,
    pub time_remaining: i64,
    pub duration: i64,
    pub session: Option<Session>,
}

impl TimerStatus {
    pub fn from_session(session: Option<Session>, now_ms: i64, idle_work_minutes: u32) -> Self {
        let update = match &session {
            Some(s) => PomodoroUpdate::at(s, now_ms),
            None => PomodoroUpdate::reset(idle_work_minutes),
        };
        Self {
            state: TimerState::from(session.as_ref()),
            pomodoro_active: session.is_some(),
            is_break: update.is_break,
            time_remaining: update.time_remaining,
            duration: update.duration,
            session,
        }
    }
}

/// Rebuild the timer status purely from persisted state, without an engine.
///
/// A phase whose end time has passed reports zero remaining until the next
/// tick performs the transition.
pub fn status(store: &dyn Store, now_ms: i64) -> Result<TimerStatus, StoreError> {
    let session = store.read::<Session>(keys::CURRENT_SESSION)?;
    let idle_work = idle_work_minutes(store, DEFAULT_WORK_MINUTES)?;
    Ok(TimerStatus::from_session(session, now_ms, idle_work))
}

/// The stored work preference, or `fallback` when none was ever saved.
fn idle_work_minutes(store: &dyn Store, fallback: u32) -> Result<u32, StoreError> {
    Ok(store
        .read::<u32>(keys::WORK_DURATION)?
        .filter(|&minutes| minutes > 0)
        .unwrap_or(fallback))
}

/// Core timer engine.
///
/// Owns the lifecycle of the single active session. The store and the bus
/// are injected; the engine never reaches for globals.
pub struct TimerEngine {
    store: Arc<dyn Store>,
    bus: Broadcaster,
    notifier: Arc<dyn Notifier>,
    default_work_minutes: u32,
    /// Cache of `currentSession`; refreshed before every decision.
    session: Option<Session>,
}

impl TimerEngine {
    /// Create an engine with an empty cache. Call [`TimerEngine::refresh`]
    /// (or use [`TimerEngine::restore`]) before relying on `state()`.
    pub fn new(store: Arc<dyn Store>, bus: Broadcaster, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            bus,
            notifier,
            default_work_minutes: DEFAULT_WORK_MINUTES,
            session: None,
        }
    }

    /// Create an engine and load whatever session the store holds.
    ///
    /// # Errors
    /// Returns an error if the persisted session cannot be read.
    pub fn restore(
        store: Arc<dyn Store>,
        bus: Broadcaster,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let mut engine = Self::new(store, bus, notifier);
        engine.refresh()?;
        Ok(engine)
    }

    pub fn with_default_work_minutes(mut self, minutes: u32) -> Self {
        self.default_work_minutes = minutes.max(1);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        TimerState::from(self.session.as_ref())
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Same view [`status`] rebuilds from the store. The idle display follows
    /// the stored work preference; the configured default only fills in when
    /// none was saved.
    pub fn status(&self, now_ms: i64) -> Result<TimerStatus> {
        let idle_work = idle_work_minutes(self.store.as_ref(), self.default_work_minutes)?;
        Ok(TimerStatus::from_session(self.session.clone(), now_ms, idle_work))
    }

    /// Reload the cached session from the store.
    pub fn refresh(&mut self) -> Result<()> {
        self.session = self.store.read::<Session>(keys::CURRENT_SESSION)?;
        Ok(())
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a fresh work phase, replacing any session already running.
    pub fn start(
        &mut self,
        work_minutes: u32,
        break_minutes: u32,
        now_ms: i64,
    ) -> Result<PomodoroUpdate> {
        if work_minutes == 0 {
            return Err(ValidationError::NonPositiveDuration {
                field: "workDuration",
            }
            .into());
        }
        if break_minutes == 0 {
            return Err(ValidationError::NonPositiveDuration {
                field: "breakDuration",
            }
            .into());
        }

        self.refresh()?;
        if let Some(previous) = &self.session {
            tracing::debug!(
                is_break = previous.is_break,
                end_time = previous.end_time,
                "replacing running session"
            );
        }

        let session = Session::begin(Phase::Working, work_minutes, break_minutes, now_ms);
        self.persist(&session)?;
        self.session = Some(session.clone());
        tracker::mirror_session(self.store.as_ref(), Some(&session))?;

        tracing::info!(
            work_minutes,
            break_minutes,
            end_time = session.end_time,
            "pomodoro started"
        );

        let update = PomodoroUpdate::at(&session, now_ms);
        self.bus.publish(Event::PomodoroUpdate(update.clone()));
        Ok(update)
    }

    /// Stop the timer in any phase and return to `Idle`.
    pub fn stop(&mut self) -> Result<PomodoroUpdate> {
        self.store.set_many(&[
            (keys::CURRENT_SESSION, serde_json::Value::Null),
            (keys::POMODORO_END_TIME, serde_json::Value::Null),
            (keys::POMODORO_ACTIVE, serde_json::Value::Bool(false)),
        ])?;
        let was = self.state();
        self.session = None;
        tracker::mirror_session(self.store.as_ref(), None)?;

        tracing::info!(from = ?was, "pomodoro stopped");

        let idle_work = idle_work_minutes(self.store.as_ref(), self.default_work_minutes)?;
        let update = PomodoroUpdate::reset(idle_work);
        self.bus.publish(Event::PomodoroUpdate(update.clone()));
        Ok(update)
    }

    /// Call once a second. Returns `None` while idle.
    ///
    /// When the phase end time has been reached this performs exactly one
    /// transition; the new phase's end time lies in the future, so a second
    /// tick right after cannot complete it again.
    pub fn tick(&mut self, now_ms: i64) -> Result<Option<PomodoroUpdate>> {
        self.refresh()?;
        let Some(session) = self.session.clone() else {
            return Ok(None);
        };

        let current = if session.is_complete(now_ms) {
            self.advance(&session, now_ms)?
        } else {
            session
        };

        let update = PomodoroUpdate::at(&current, now_ms);
        tracing::debug!(
            is_break = update.is_break,
            remaining_ms = update.time_remaining,
            "tick"
        );
        self.bus.publish(Event::PomodoroUpdate(update.clone()));
        Ok(Some(update))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn advance(&mut self, finished: &Session, now_ms: i64) -> Result<Session> {
        let next = finished.next(now_ms);
        self.persist(&next)?;
        self.session = Some(next.clone());
        tracker::mirror_session(self.store.as_ref(), Some(&next))?;

        tracing::info!(
            from = ?finished.phase(),
            to = ?next.phase(),
            end_time = next.end_time,
            "phase complete"
        );

        if finished.phase() == Phase::Working {
            let snapshot = tracker::record_completed_pomodoro(
                self.store.as_ref(),
                finished.work_duration,
                local_date(now_ms),
            )?;
            self.notifier.notify(&Notification::pomodoro_complete());
            self.bus.publish(snapshot.to_event());
        }
        Ok(next)
    }

    fn persist(&self, session: &Session) -> Result<()> {
        self.store.set_many(&[
            (keys::CURRENT_SESSION, serde_json::to_value(session)?),
            (keys::POMODORO_END_TIME, serde_json::Value::from(session.end_time)),
            (keys::POMODORO_ACTIVE, serde_json::Value::Bool(true)),
        ])?;
        Ok(())
    }
}
