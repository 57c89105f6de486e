//! Async driver around [`FocusService`].
//!
//! The service sits behind a `tokio::sync::Mutex`, so commands, ticks and the
//! midnight reset run one at a time. A ticker task exists only while a
//! session is active: it is armed by `startPomodoro`, by [`Daemon::resume`]
//! when a session survived a restart, or by the store watch when another
//! process started one. It ends on its own once the engine reports idle.
//!
//! Other processes share nothing with the daemon but the store. The watch
//! started by [`Daemon::spawn_store_watch`] polls it and rebroadcasts what
//! they changed on this daemon's bus.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time;

use crate::bus::{Broadcaster, Subscription};
use crate::clock::now_ms;
use crate::error::Result;
use crate::service::{Command, FocusService, Response};
use crate::stats::DailyResetPoller;

#[derive(Clone)]
pub struct Daemon {
    service: Arc<Mutex<FocusService>>,
    bus: Broadcaster,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    daily_reset: Arc<Mutex<Option<JoinHandle<()>>>>,
    store_watch: Arc<Mutex<Option<JoinHandle<()>>>>,
    tick_interval: Duration,
}

impl Daemon {
    pub fn new(service: FocusService, tick_interval: Duration) -> Self {
        let bus = service.bus().clone();
        Self {
            service: Arc::new(Mutex::new(service)),
            bus,
            ticker: Arc::new(Mutex::new(None)),
            daily_reset: Arc::new(Mutex::new(None)),
            store_watch: Arc::new(Mutex::new(None)),
            tick_interval: tick_interval.max(Duration::from_millis(1)),
        }
    }

    pub fn subscribe(&self) -> Subscription {
        self.bus.subscribe()
    }

    pub fn service(&self) -> Arc<Mutex<FocusService>> {
        self.service.clone()
    }

    /// Run one command against the service.
    ///
    /// `stopPomodoro` cancels the ticker while the service lock is held, so no
    /// tick can land after the stop.
    pub async fn dispatch(&self, command: Command) -> Result<Option<Response>> {
        let starts = matches!(command, Command::StartPomodoro { .. });
        let stops = matches!(command, Command::StopPomodoro);

        let response = {
            let mut service = self.service.lock().await;
            if stops {
                self.cancel_ticker().await;
            }
            service.handle(command, now_ms())?
        };

        if starts {
            self.spawn_ticker().await;
        }
        Ok(response)
    }

    /// Pick up a session left running by a previous process.
    ///
    /// Returns true when a ticker was armed.
    pub async fn resume(&self) -> Result<bool> {
        let active = {
            let mut service = self.service.lock().await;
            service.refresh()?;
            service.engine().is_active()
        };
        if active {
            tracing::info!("resuming active session");
            self.spawn_ticker().await;
        }
        Ok(active)
    }

    pub async fn is_ticking(&self) -> bool {
        self.ticker
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Start the midnight reset poller. Replaces a poller already running.
    pub async fn spawn_daily_reset(&self, poll_interval: Duration) {
        let mut guard = self.daily_reset.lock().await;
        if let Some(handle) = guard.take() {
            handle.abort();
        }

        let service = self.service.clone();
        let poll_interval = poll_interval.max(Duration::from_millis(1));
        *guard = Some(tokio::spawn(async move {
            let mut poller = DailyResetPoller::new();
            let mut interval = time::interval(poll_interval);
            loop {
                interval.tick().await;
                if !poller.poll(&Local::now()) {
                    continue;
                }
                let mut service = service.lock().await;
                if let Err(e) = service.reset_daily(now_ms()) {
                    tracing::warn!(error = %e, "daily reset failed");
                }
            }
        }));
    }

    /// Poll the store for changes made by other processes. Arms the ticker
    /// when a session appears that this daemon did not start. Replaces a
    /// watch already running.
    pub async fn spawn_store_watch(&self, poll_interval: Duration) {
        let mut guard = self.store_watch.lock().await;
        if let Some(handle) = guard.take() {
            handle.abort();
        }

        let daemon = self.clone();
        let poll_interval = poll_interval.max(Duration::from_millis(1));
        *guard = Some(tokio::spawn(async move {
            let mut interval = time::interval(poll_interval);
            loop {
                interval.tick().await;

                let synced = {
                    let mut service = daemon.service.lock().await;
                    service.sync_from_store(now_ms())
                };

                match synced {
                    Ok(true) => {
                        if !daemon.is_ticking().await {
                            tracing::info!("session found in store, arming ticker");
                            daemon.spawn_ticker().await;
                        }
                    }
                    Ok(false) => {}
                    Err(e) => tracing::warn!(error = %e, "store sync failed"),
                }
            }
        }));
    }

    /// Abort every background task.
    pub async fn shutdown(&self) {
        self.cancel_ticker().await;
        if let Some(handle) = self.daily_reset.lock().await.take() {
            handle.abort();
        }
        if let Some(handle) = self.store_watch.lock().await.take() {
            handle.abort();
        }
        tracing::debug!("daemon shut down");
    }

    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
            tracing::debug!("ticker cancelled");
        }
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            handle.abort();
        }

        let service = self.service.clone();
        let tick_interval = self.tick_interval;

        *ticker_guard = Some(tokio::spawn(async move {
            let mut interval = time::interval_at(time::Instant::now() + tick_interval, tick_interval);
            loop {
                interval.tick().await;

                let outcome = {
                    let mut guard = service.lock().await;
                    guard.tick(now_ms())
                };

                match outcome {
                    Ok(Some(_)) => {}
                    Ok(None) => {
                        tracing::debug!("timer idle, ticker exiting");
                        break;
                    }
                    Err(e) => tracing::warn!(error = %e, "tick failed"),
                }
            }
        }));
    }
}
