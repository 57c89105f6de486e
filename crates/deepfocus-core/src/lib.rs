//! # DeepFocus Core Library
//!
//! Core logic for the DeepFocus browser productivity engine: a pomodoro
//! timer that survives being torn down between ticks, a site blocklist
//! compiled into redirect rules, focus-mode preferences and daily/weekly
//! distraction analytics. The `deepfocus-cli` binary is a thin front end
//! over the same library.
//!
//! ## Architecture
//!
//! - **Store**: a shared key-value store is the source of truth. Every
//!   component re-reads what it needs instead of trusting memory.
//! - **Timer Engine**: a wall-clock state machine driven by `tick()`; remaining
//!   time is always derived from an absolute end timestamp
//! - **Bus**: publish/subscribe fan-out of [`Event`]s to any number of
//!   listeners
//! - **Service / Daemon**: command dispatch, and the tokio tasks that tick the
//!   timer and reset daily stats at midnight
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`FocusService`]: Command dispatcher over engine, stats and blocklist
//! - [`Database`]: SQLite-backed [`Store`]
//! - [`Config`]: Application configuration management

pub mod blocklist;
pub mod bus;
pub mod clock;
pub mod daemon;
pub mod error;
pub mod events;
pub mod focus;
pub mod notify;
pub mod service;
pub mod stats;
pub mod storage;
pub mod timer;

pub use blocklist::{BlockedSites, NavigationVerdict, RedirectRule, RuleTable, StoreRuleTable};
pub use bus::{Broadcaster, Subscription};
pub use daemon::Daemon;
pub use error::{ConfigError, CoreError, Result, StoreError, ValidationError};
pub use events::Event;
pub use focus::{FilterLevel, Preferences};
pub use notify::{Notification, Notifier, TracingNotifier};
pub use service::{Command, FocusService, Response, ServiceOptions};
pub use stats::{AnalyticsData, DailyStats, StatsSnapshot};
pub use storage::{Config, Database, MemoryStore, Store, StoreExt};
pub use timer::{PomodoroUpdate, Session, TimerEngine, TimerState, TimerStatus};
