//! Command dispatcher for every context that talks to the engine.
//!
//! A [`FocusService`] owns the timer engine, the rule table and the handles to
//! the store and the bus. Popups, pages and the navigation hook send
//! [`Command`]s; replies come back as [`Response`]s and everything observable
//! is also broadcast as an [`Event`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::blocklist::{sync_rules, BlockedSites, NavigationVerdict, RedirectRule, RuleTable, StoreRuleTable};
use crate::bus::Broadcaster;
use crate::clock::local_date;
use crate::error::{Result, ValidationError};
use crate::events::Event;
use crate::focus::{self, clamp_dimming, FilterLevel, Preferences};
use crate::notify::Notifier;
use crate::stats::{tracker, DailyStats, StatsSnapshot, TAB_SWITCH_DEBOUNCE_MS};
use crate::storage::{keys, Config, Store, StoreExt};
use crate::timer::{PomodoroUpdate, TimerEngine, TimerStatus};

/// Inbound messages, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    #[serde(rename_all = "camelCase")]
    StartPomodoro {
        work_duration: u32,
        break_duration: u32,
    },
    StopPomodoro,
    TabSwitch {
        /// Epoch ms when the page was hidden.
        timestamp: i64,
    },
    GetStats,
    UpdateBlockedSites {
        sites: Vec<String>,
    },
    Navigate {
        url: String,
    },
    OverrideBlock,
    ToggleFocusMode {
        enabled: bool,
    },
    ToggleGrayMode {
        enabled: bool,
    },
    UpdateDimming {
        level: u32,
    },
    SetFilterLevel {
        level: String,
    },
    SetSoundscape {
        id: String,
    },
    FilterElementAtPoint {
        x: f64,
        y: f64,
    },
    AddCustomFilter {
        selector: String,
    },
}

/// Replies to commands that have one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Response {
    Stats(StatsSnapshot),
    Navigation { verdict: NavigationVerdict },
    Pomodoro { update: PomodoroUpdate },
    Rules { rules: Vec<RedirectRule> },
}

/// Knobs taken from [`Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceOptions {
    pub default_work_minutes: u32,
    pub default_break_minutes: u32,
    pub tab_switch_debounce_ms: i64,
    pub blocked_page: String,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ServiceOptions {
    fn from(config: &Config) -> Self {
        Self {
            default_work_minutes: config.timer.work_duration.max(1),
            default_break_minutes: config.timer.break_duration.max(1),
            tab_switch_debounce_ms: if config.tracking.tab_switch_debounce_ms < 0 {
                TAB_SWITCH_DEBOUNCE_MS
            } else {
                config.tracking.tab_switch_debounce_ms
            },
            blocked_page: config.blocking.blocked_page.clone(),
        }
    }
}

/// Store contents as of the last [`FocusService::sync_from_store`].
#[derive(Debug, Clone)]
struct Observed {
    active: bool,
    stats: DailyStats,
    preferences: Preferences,
}

pub struct FocusService {
    store: Arc<dyn Store>,
    bus: Broadcaster,
    engine: TimerEngine,
    rules: Box<dyn RuleTable>,
    options: ServiceOptions,
    observed: Option<Observed>,
}

impl FocusService {
    /// Build a service over `store`, restoring any running session.
    pub fn new(
        store: Arc<dyn Store>,
        bus: Broadcaster,
        notifier: Arc<dyn Notifier>,
        options: ServiceOptions,
    ) -> Result<Self> {
        let engine = TimerEngine::restore(store.clone(), bus.clone(), notifier)?
            .with_default_work_minutes(options.default_work_minutes);
        let rules = Box::new(StoreRuleTable::new(store.clone()));
        Ok(Self {
            store,
            bus,
            engine,
            rules,
            options,
            observed: None,
        })
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn bus(&self) -> &Broadcaster {
        &self.bus
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn options(&self) -> &ServiceOptions {
        &self.options
    }

    /// Route one command. Commands without a reply return `Ok(None)`.
    pub fn handle(&mut self, command: Command, now_ms: i64) -> Result<Option<Response>> {
        tracing::debug!(?command, "handling command");
        let response = match command {
            Command::StartPomodoro {
                work_duration,
                break_duration,
            } => Some(Response::Pomodoro {
                update: self.start_pomodoro(work_duration, break_duration, now_ms)?,
            }),
            Command::StopPomodoro => Some(Response::Pomodoro {
                update: self.stop_pomodoro()?,
            }),
            Command::TabSwitch { timestamp } => {
                self.tab_switch(timestamp, now_ms)?.map(Response::Stats)
            }
            Command::GetStats => Some(Response::Stats(self.stats(now_ms)?)),
            Command::UpdateBlockedSites { sites } => Some(Response::Rules {
                rules: self.update_blocked_sites(BlockedSites::new(sites))?,
            }),
            Command::Navigate { url } => Some(Response::Navigation {
                verdict: self.handle_navigation(&url, now_ms)?,
            }),
            Command::OverrideBlock => Some(Response::Stats(self.override_block(now_ms)?)),
            Command::ToggleFocusMode { enabled } => {
                self.set_focus_mode(enabled)?;
                None
            }
            Command::ToggleGrayMode { enabled } => {
                self.set_gray_mode(enabled)?;
                None
            }
            Command::UpdateDimming { level } => {
                self.set_dimming(level)?;
                None
            }
            Command::SetFilterLevel { level } => {
                self.set_filter_level(level.parse()?)?;
                None
            }
            Command::SetSoundscape { id } => {
                self.set_soundscape(&id)?;
                None
            }
            Command::FilterElementAtPoint { x, y } => {
                self.filter_element_at_point(x, y);
                None
            }
            Command::AddCustomFilter { selector } => {
                focus::add_custom_filter(self.store.as_ref(), &selector)?;
                None
            }
        };
        Ok(response)
    }

    // ── Timer ────────────────────────────────────────────────────────

    /// Start a session and remember the durations as the popup defaults.
    pub fn start_pomodoro(
        &mut self,
        work_minutes: u32,
        break_minutes: u32,
        now_ms: i64,
    ) -> Result<PomodoroUpdate> {
        let update = self.engine.start(work_minutes, break_minutes, now_ms)?;
        self.store.set_many(&[
            (keys::WORK_DURATION, work_minutes.into()),
            (keys::BREAK_DURATION, break_minutes.into()),
        ])?;
        Ok(update)
    }

    /// Start with the stored popup durations, or the configured defaults.
    pub fn start_default(&mut self, now_ms: i64) -> Result<PomodoroUpdate> {
        let work = self
            .store
            .read::<u32>(keys::WORK_DURATION)?
            .unwrap_or(self.options.default_work_minutes);
        let brk = self
            .store
            .read::<u32>(keys::BREAK_DURATION)?
            .unwrap_or(self.options.default_break_minutes);
        self.start_pomodoro(work, brk, now_ms)
    }

    pub fn stop_pomodoro(&mut self) -> Result<PomodoroUpdate> {
        let update = self.engine.stop()?;
        if let Some(observed) = &mut self.observed {
            observed.active = false;
        }
        Ok(update)
    }

    pub fn tick(&mut self, now_ms: i64) -> Result<Option<PomodoroUpdate>> {
        self.engine.tick(now_ms)
    }

    /// Reload the engine's cached session from the store.
    pub fn refresh(&mut self) -> Result<()> {
        self.engine.refresh()
    }

    pub fn timer_status(&mut self, now_ms: i64) -> Result<TimerStatus> {
        self.engine.refresh()?;
        self.engine.status(now_ms)
    }

    /// Catch up with writes other processes made to the shared store.
    ///
    /// Reloads the session and broadcasts whatever changed since the previous
    /// call: a reset `pomodoroUpdate` when the session was stopped elsewhere,
    /// `statsUpdate` when today's stats moved, and the page events for
    /// changed preferences. The first call only records a baseline.
    ///
    /// Returns whether a session is active.
    pub fn sync_from_store(&mut self, now_ms: i64) -> Result<bool> {
        self.engine.refresh()?;
        let current = Observed {
            active: self.engine.is_active(),
            stats: self.stats(now_ms)?.daily_stats,
            preferences: self.preferences()?,
        };

        if let Some(previous) = self.observed.take() {
            if previous.active && !current.active {
                let status = self.engine.status(now_ms)?;
                tracing::info!("session stopped elsewhere");
                self.bus.publish(Event::PomodoroUpdate(PomodoroUpdate {
                    is_break: status.is_break,
                    time_remaining: status.time_remaining,
                    duration: status.duration,
                }));
            }
            if previous.stats != current.stats {
                let snapshot = self.stats(now_ms)?;
                self.bus.publish(snapshot.to_event());
            }
            for event in preference_changes(&previous.preferences, &current.preferences) {
                self.bus.publish(event);
            }
        }

        let active = current.active;
        self.observed = Some(current);
        Ok(active)
    }

    // ── Stats ────────────────────────────────────────────────────────

    pub fn stats(&self, now_ms: i64) -> Result<StatsSnapshot> {
        Ok(tracker::load(self.store.as_ref(), local_date(now_ms))?)
    }

    /// Count a tab switch unless it falls inside the debounce window.
    pub fn tab_switch(&mut self, timestamp: i64, now_ms: i64) -> Result<Option<StatsSnapshot>> {
        let snapshot = tracker::record_tab_switch(
            self.store.as_ref(),
            timestamp,
            self.options.tab_switch_debounce_ms,
            local_date(now_ms),
        )?;
        match &snapshot {
            Some(snapshot) => self.publish_stats(snapshot),
            None => tracing::debug!(timestamp, "tab switch debounced"),
        }
        Ok(snapshot)
    }

    /// Zero today's counters, keeping the analytics window.
    pub fn reset_daily(&mut self, now_ms: i64) -> Result<StatsSnapshot> {
        tracker::reset_daily(self.store.as_ref())?;
        let snapshot = self.stats(now_ms)?;
        tracing::info!("daily stats reset");
        self.publish_stats(&snapshot);
        Ok(snapshot)
    }

    fn publish_stats(&mut self, snapshot: &StatsSnapshot) {
        if let Some(observed) = &mut self.observed {
            observed.stats = snapshot.daily_stats.clone();
        }
        self.bus.publish(snapshot.to_event());
    }

    /// Record a preference this service changed itself, so the next sync
    /// does not broadcast it again.
    fn note_preference(&mut self, change: impl FnOnce(&mut Preferences)) {
        if let Some(observed) = &mut self.observed {
            change(&mut observed.preferences);
        }
    }

    // ── Blocklist ────────────────────────────────────────────────────

    pub fn blocked_sites(&self) -> Result<BlockedSites> {
        Ok(BlockedSites::load(self.store.as_ref())?)
    }

    /// Persist the list and rebuild the rule table from it.
    pub fn update_blocked_sites(&mut self, sites: BlockedSites) -> Result<Vec<RedirectRule>> {
        sites.save(self.store.as_ref())?;
        sync_rules(self.rules.as_ref(), &sites, &self.options.blocked_page)
    }

    pub fn add_blocked_site(&mut self, site: &str) -> Result<Vec<RedirectRule>> {
        let mut sites = self.blocked_sites()?;
        sites.add(site)?;
        self.update_blocked_sites(sites)
    }

    pub fn remove_blocked_site(&mut self, site: &str) -> Result<Vec<RedirectRule>> {
        let mut sites = self.blocked_sites()?;
        if !sites.remove(site) {
            return Err(ValidationError::InvalidValue {
                field: "site".into(),
                message: format!("'{}' is not blocked", site.trim()),
            }
            .into());
        }
        self.update_blocked_sites(sites)
    }

    pub fn installed_rules(&self) -> Result<Vec<RedirectRule>> {
        self.rules.rules()
    }

    /// Navigation hook. Every hit counts as a distraction, even when the
    /// declarative rules would have redirected the same navigation.
    pub fn handle_navigation(&mut self, url: &str, now_ms: i64) -> Result<NavigationVerdict> {
        let sites = self.blocked_sites()?;
        let Some(site) = sites.matching_site(url) else {
            return Ok(NavigationVerdict::Allow);
        };
        let verdict = NavigationVerdict::Redirect {
            site: site.to_string(),
            to: self.options.blocked_page.clone(),
        };
        tracing::info!(url, site, "navigation blocked");

        let snapshot = tracker::record_distraction(self.store.as_ref(), local_date(now_ms), true)?;
        self.publish_stats(&snapshot);
        Ok(verdict)
    }

    /// The user chose to continue past the blocked page.
    pub fn override_block(&mut self, now_ms: i64) -> Result<StatsSnapshot> {
        let snapshot = tracker::record_distraction(self.store.as_ref(), local_date(now_ms), false)?;
        tracing::info!("block overridden");
        self.publish_stats(&snapshot);
        Ok(snapshot)
    }

    // ── Focus controls ───────────────────────────────────────────────

    pub fn preferences(&self) -> Result<Preferences> {
        Ok(Preferences::load(self.store.as_ref())?)
    }

    pub fn set_focus_mode(&mut self, enabled: bool) -> Result<()> {
        self.store.set(keys::FOCUS_MODE, enabled.into())?;
        self.note_preference(|p| p.focus_mode = enabled);
        self.bus.publish(Event::ToggleFocusMode { enabled });
        Ok(())
    }

    pub fn set_gray_mode(&mut self, enabled: bool) -> Result<()> {
        self.store.set(keys::GRAY_MODE, enabled.into())?;
        self.note_preference(|p| p.gray_mode = enabled);
        self.bus.publish(Event::ToggleGrayMode { enabled });
        Ok(())
    }

    /// Returns the level actually stored.
    pub fn set_dimming(&mut self, level: u32) -> Result<u8> {
        let level = clamp_dimming(level);
        self.store.set(keys::DIMMING_LEVEL, level.into())?;
        self.note_preference(|p| p.dimming_level = level);
        self.bus.publish(Event::UpdateDimming { level });
        Ok(level)
    }

    pub fn set_filter_level(&mut self, level: FilterLevel) -> Result<()> {
        self.store.set(keys::FILTER_LEVEL, level.as_str().into())?;
        self.note_preference(|p| p.filter_level = level);
        self.bus.publish(Event::SetFilterLevel { level });
        Ok(())
    }

    pub fn set_soundscape(&mut self, id: &str) -> Result<()> {
        let id = match id.trim() {
            "" => focus::NO_SOUNDSCAPE,
            id => id,
        };
        self.store.set(keys::SOUNDSCAPE, id.into())?;
        self.note_preference(|p| p.soundscape = id.to_string());
        let asset = focus::soundscape_asset(id);
        tracing::debug!(soundscape = id, ?asset, "soundscape set");
        self.bus.publish(Event::HandleSound {
            sound_type: id.to_string(),
            asset,
        });
        Ok(())
    }

    /// Ask the page to filter whatever element sits at `(x, y)`. The page
    /// reports the resulting selector back with `addCustomFilter`.
    pub fn filter_element_at_point(&mut self, x: f64, y: f64) {
        self.bus.publish(Event::FilterElementAtPoint { x, y });
    }

    pub fn add_custom_filter(&mut self, selector: &str) -> Result<Vec<String>> {
        focus::add_custom_filter(self.store.as_ref(), selector)
    }
}

/// Page events for every preference that differs between `before` and `after`.
fn preference_changes(before: &Preferences, after: &Preferences) -> Vec<Event> {
    let mut events = Vec::new();
    if before.focus_mode != after.focus_mode {
        events.push(Event::ToggleFocusMode {
            enabled: after.focus_mode,
        });
    }
    if before.gray_mode != after.gray_mode {
        events.push(Event::ToggleGrayMode {
            enabled: after.gray_mode,
        });
    }
    if before.dimming_level != after.dimming_level {
        events.push(Event::UpdateDimming {
            level: after.dimming_level,
        });
    }
    if before.filter_level != after.filter_level {
        events.push(Event::SetFilterLevel {
            level: after.filter_level,
        });
    }
    if before.soundscape != after.soundscape {
        events.push(Event::HandleSound {
            sound_type: after.soundscape.clone(),
            asset: focus::soundscape_asset(&after.soundscape),
        });
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::TracingNotifier;
    use crate::storage::MemoryStore;
    use serde_json::json;

    const T0: i64 = 1_700_000_000_000;

    fn service() -> FocusService {
        FocusService::new(
            Arc::new(MemoryStore::new()),
            Broadcaster::new(),
            Arc::new(TracingNotifier),
            ServiceOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn commands_parse_from_wire_json() {
        let cmd: Command = serde_json::from_value(json!({
            "type": "startPomodoro", "workDuration": 50, "breakDuration": 10
        }))
        .unwrap();
        assert_eq!(
            cmd,
            Command::StartPomodoro {
                work_duration: 50,
                break_duration: 10
            }
        );
        let cmd: Command = serde_json::from_value(json!({"type": "tabSwitch", "timestamp": 5})).unwrap();
        assert_eq!(cmd, Command::TabSwitch { timestamp: 5 });
    }

    #[test]
    fn start_command_replies_with_update_and_saves_durations() {
        let mut svc = service();
        let reply = svc
            .handle(
                Command::StartPomodoro {
                    work_duration: 50,
                    break_duration: 10,
                },
                T0,
            )
            .unwrap();
        assert_eq!(
            reply,
            Some(Response::Pomodoro {
                update: PomodoroUpdate {
                    is_break: false,
                    time_remaining: 3_000_000,
                    duration: 3_000_000
                }
            })
        );
        let prefs = svc.preferences().unwrap();
        assert_eq!((prefs.work_duration, prefs.break_duration), (50, 10));
    }

    #[test]
    fn zero_duration_is_a_validation_error() {
        let mut svc = service();
        let err = svc
            .handle(
                Command::StartPomodoro {
                    work_duration: 0,
                    break_duration: 5,
                },
                T0,
            )
            .unwrap_err();
        assert!(matches!(err, crate::error::CoreError::Validation(_)));
    }

    #[test]
    fn debounced_tab_switch_has_no_reply() {
        let mut svc = service();
        let mut sub = svc.bus().subscribe();
        assert!(svc.handle(Command::TabSwitch { timestamp: T0 }, T0).unwrap().is_some());
        assert!(svc
            .handle(Command::TabSwitch { timestamp: T0 + 500 }, T0)
            .unwrap()
            .is_none());
        assert_eq!(sub.drain().len(), 1);
    }

    #[test]
    fn navigation_to_blocked_site_redirects_and_counts() {
        let mut svc = service();
        svc.handle(
            Command::UpdateBlockedSites {
                sites: vec!["Example.com".into()],
            },
            T0,
        )
        .unwrap();

        let reply = svc
            .handle(Command::Navigate { url: "https://sub.example.com/path".into() }, T0)
            .unwrap();
        assert_eq!(
            reply,
            Some(Response::Navigation {
                verdict: NavigationVerdict::Redirect {
                    site: "example.com".into(),
                    to: "/blocked.html".into()
                }
            })
        );
        let allowed = svc.handle_navigation("https://example.org", T0).unwrap();
        assert_eq!(allowed, NavigationVerdict::Allow);

        let stats = svc.stats(T0).unwrap();
        assert_eq!(stats.daily_stats.distractions, 1);
        assert_eq!(stats.focus_score, 95);
        assert_eq!(stats.analytics_data.blocked_sites_history[crate::stats::TODAY], 1);
    }

    #[test]
    fn site_list_edits_resync_rules() {
        let mut svc = service();
        svc.add_blocked_site("a.com").unwrap();
        let rules = svc.add_blocked_site("b.com").unwrap();
        assert_eq!(rules.len(), 2);
        let rules = svc.remove_blocked_site("a.com").unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].id, 1);
        assert_eq!(svc.installed_rules().unwrap(), rules);
        assert!(svc.remove_blocked_site("zzz.com").is_err());
    }

    #[test]
    fn override_counts_one_distraction() {
        let mut svc = service();
        let snap = svc.override_block(T0).unwrap();
        assert_eq!(snap.daily_stats.distractions, 1);
        assert_eq!(snap.analytics_data.blocked_sites_history[crate::stats::TODAY], 0);
    }

    #[test]
    fn focus_controls_persist_and_broadcast() {
        let mut svc = service();
        let mut sub = svc.bus().subscribe();
        svc.handle(Command::ToggleFocusMode { enabled: true }, T0).unwrap();
        svc.handle(Command::UpdateDimming { level: 140 }, T0).unwrap();
        svc.handle(Command::SetFilterLevel { level: "extreme".into() }, T0).unwrap();
        svc.handle(Command::SetSoundscape { id: "rain".into() }, T0).unwrap();

        let prefs = svc.preferences().unwrap();
        assert!(prefs.focus_mode);
        assert_eq!(prefs.dimming_level, 100);
        assert_eq!(prefs.filter_level, FilterLevel::Extreme);
        assert_eq!(prefs.soundscape, "rain");

        let names: Vec<_> = sub.drain().iter().map(Event::name).collect();
        assert_eq!(
            names,
            vec!["toggleFocusMode", "updateDimming", "setFilterLevel", "handleSound"]
        );
    }

    #[test]
    fn clearing_the_soundscape_broadcasts_silence() {
        let mut svc = service();
        let mut sub = svc.bus().subscribe();
        svc.set_soundscape("rain").unwrap();
        svc.set_soundscape("  ").unwrap();
        assert_eq!(
            sub.drain(),
            vec![
                Event::HandleSound {
                    sound_type: "rain".into(),
                    asset: Some("sounds/rain.mp3".into())
                },
                Event::HandleSound {
                    sound_type: "none".into(),
                    asset: None
                },
            ]
        );
        assert_eq!(svc.preferences().unwrap().soundscape, "none");
    }

    #[test]
    fn stopped_timer_reports_the_saved_work_length() {
        let mut svc = service();
        svc.start_pomodoro(50, 10, T0).unwrap();
        let update = svc.stop_pomodoro().unwrap();
        assert_eq!(update, PomodoroUpdate::reset(50));
        let shown = svc.timer_status(T0 + 1000).unwrap();
        assert_eq!(shown, crate::timer::status(svc.store().as_ref(), T0 + 1000).unwrap());
        assert_eq!(shown.duration, 3_000_000);
    }

    #[test]
    fn unknown_filter_level_changes_nothing() {
        let mut svc = service();
        assert!(svc
            .handle(Command::SetFilterLevel { level: "max".into() }, T0)
            .is_err());
        assert_eq!(svc.preferences().unwrap().filter_level, FilterLevel::None);
    }

    #[test]
    fn reset_daily_keeps_analytics() {
        let mut svc = service();
        svc.override_block(T0).unwrap();
        let before = svc.stats(T0).unwrap().analytics_data;
        let snap = svc.reset_daily(T0).unwrap();
        assert_eq!(snap.daily_stats.distractions, 0);
        assert_eq!(snap.focus_score, 100);
        assert_eq!(snap.analytics_data, before);
    }

    fn service_on(store: Arc<MemoryStore>) -> FocusService {
        FocusService::new(
            store,
            Broadcaster::new(),
            Arc::new(TracingNotifier),
            ServiceOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn sync_broadcasts_what_another_process_changed() {
        let store = Arc::new(MemoryStore::new());
        let mut local = service_on(store.clone());
        let mut other = service_on(store);
        let mut sub = local.bus().subscribe();

        assert!(!local.sync_from_store(T0).unwrap());
        assert!(sub.drain().is_empty());

        other.start_pomodoro(25, 5, T0).unwrap();
        other.set_gray_mode(true).unwrap();
        other.override_block(T0).unwrap();
        assert!(local.sync_from_store(T0).unwrap());
        assert!(local.engine().is_active());
        let names: Vec<_> = sub.drain().iter().map(Event::name).collect();
        assert_eq!(names, vec!["statsUpdate", "toggleGrayMode"]);

        other.stop_pomodoro().unwrap();
        assert!(!local.sync_from_store(T0).unwrap());
        let events = sub.drain();
        assert_eq!(events[0], Event::PomodoroUpdate(PomodoroUpdate::reset(25)));
        assert_eq!(events.len(), 2, "session mirror changed too");
    }

    #[test]
    fn sync_does_not_repeat_local_broadcasts() {
        let mut svc = service();
        svc.sync_from_store(T0).unwrap();
        svc.set_focus_mode(true).unwrap();
        svc.set_soundscape("rain").unwrap();
        svc.override_block(T0).unwrap();

        let mut sub = svc.bus().subscribe();
        assert!(!svc.sync_from_store(T0).unwrap());
        assert!(sub.drain().is_empty());
    }

    #[test]
    fn custom_filter_via_command() {
        let mut svc = service();
        svc.handle(Command::AddCustomFilter { selector: "div.feed".into() }, T0)
            .unwrap();
        assert_eq!(
            focus::custom_filters(svc.store().as_ref()).unwrap(),
            vec!["div.feed".to_string()]
        );
    }
}
