//! Publish/subscribe broadcast channel.
//!
//! Listeners come and go at any time (a popup opens, a page reloads). Each
//! subscriber gets its own unbounded queue; publishing never blocks and a
//! subscriber that has gone away is dropped from the set instead of failing
//! the publisher. The next broadcast supersedes anything a dead listener
//! missed, so there are no retries.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use tokio::sync::mpsc;

use crate::events::Event;

pub type SubscriberId = u64;

#[derive(Debug, Default)]
struct Inner {
    next_id: AtomicU64,
    subscribers: Mutex<HashMap<SubscriberId, mpsc::UnboundedSender<Event>>>,
}

/// Cheap-to-clone handle to the shared broadcast channel.
#[derive(Debug, Clone, Default)]
pub struct Broadcaster {
    inner: Arc<Inner>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        match self.inner.subscribers.lock() {
            Ok(mut subscribers) => {
                subscribers.insert(id, tx);
            }
            Err(_) => tracing::warn!(subscriber = id, "subscriber table poisoned"),
        }
        tracing::debug!(subscriber = id, "subscribed");
        Subscription {
            id,
            rx,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Remove a subscriber. Returns false when it was already gone.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        unsubscribe(&self.inner, id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .subscribers
            .lock()
            .map(|subscribers| subscribers.len())
            .unwrap_or(0)
    }

    /// Fire-and-forget delivery to every current subscriber.
    ///
    /// Returns how many subscribers received the event.
    pub fn publish(&self, event: Event) -> usize {
        let Ok(mut subscribers) = self.inner.subscribers.lock() else {
            tracing::warn!(event = event.name(), "subscriber table poisoned, event dropped");
            return 0;
        };

        let mut dead = Vec::new();
        for (id, tx) in subscribers.iter() {
            if tx.send(event.clone()).is_err() {
                dead.push(*id);
            }
        }
        for id in &dead {
            subscribers.remove(id);
            tracing::debug!(subscriber = id, event = event.name(), "listener gone, dropped");
        }
        subscribers.len()
    }
}

fn unsubscribe(inner: &Inner, id: SubscriberId) -> bool {
    inner
        .subscribers
        .lock()
        .map(|mut subscribers| subscribers.remove(&id).is_some())
        .unwrap_or(false)
}

/// Receiving end of one subscriber. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    rx: mpsc::UnboundedReceiver<Event>,
    bus: Weak<Inner>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next event. `None` once the bus itself is gone.
    pub async fn recv(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Next queued event, if any, without waiting.
    pub fn try_recv(&mut self) -> Option<Event> {
        self.rx.try_recv().ok()
    }

    /// Drain everything queued so far.
    pub fn drain(&mut self) -> Vec<Event> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.bus.upgrade() {
            unsubscribe(&inner, self.id);
        }
    }
}
