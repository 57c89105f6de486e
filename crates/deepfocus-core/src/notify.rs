//! Notification surface.
//!
//! Alerts are an external concern. The engine only hands a [`Notification`]
//! to whatever [`Notifier`] it was built with.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

impl Notification {
    /// Sent when a work phase finishes and the break begins.
    pub fn pomodoro_complete() -> Self {
        Self {
            title: "Pomodoro Complete!".into(),
            message: "Time for a break. Great work!".into(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: &Notification) {
        tracing::info!(title = %notification.title, "{}", notification.message);
    }
}
