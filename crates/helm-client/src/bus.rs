//! Event fan-out to in-process subscribers.
//!
//! A single-writer / multi-reader broadcast channel for push events,
//! passed explicitly to whoever needs it (stores, the stream client,
//! tests with a fake event source) rather than living in a module-level
//! singleton. Subscribers only read; the stream client (or a test)
//! publishes.
//!
//! Alongside the live feed the bus keeps the most recent event and the
//! connection health as watch cells, so late subscribers can see where
//! things stand without replaying history.

use std::sync::Arc;

use helm_core::events::PushEvent;
use metrics::counter;
use tokio::sync::{broadcast, watch};
use tracing::debug;

/// Default broadcast buffer size per subscriber.
const DEFAULT_CAPACITY: usize = 256;

/// Health of the push connection as seen by subscribers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectionHealth {
    /// Whether the stream is currently open.
    pub connected: bool,
    /// Human-readable description of the last failure, cleared on a
    /// successful (re)connect.
    pub error: Option<String>,
}

struct BusInner {
    events: broadcast::Sender<PushEvent>,
    last_event: watch::Sender<Option<PushEvent>>,
    health: watch::Sender<ConnectionHealth>,
}

/// Shared publish/subscribe handle. Cheap to clone.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    /// Create a bus with the given per-subscriber buffer capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity);
        let (last_event, _) = watch::channel(None);
        let (health, _) = watch::channel(ConnectionHealth::default());
        Self {
            inner: Arc::new(BusInner {
                events,
                last_event,
                health,
            }),
        }
    }

    /// Create a bus with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Publish an event to every subscriber and record it as the most
    /// recent one. Publishing with no live subscribers is not an error.
    pub fn publish(&self, event: PushEvent) {
        counter!("helm_events_published_total").increment(1);
        debug!(event = %event.event, "push event");
        let _ = self.inner.last_event.send_replace(Some(event.clone()));
        // A send error only means nobody is subscribed right now.
        let _ = self.inner.events.send(event);
    }

    /// Subscribe to the live event feed.
    ///
    /// A subscriber that falls more than the buffer capacity behind
    /// observes a `Lagged` error on the receiver and continues from the
    /// oldest retained event; slow readers lose events, they do not
    /// block the stream.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PushEvent> {
        self.inner.events.subscribe()
    }

    /// The most recently published event, if any.
    #[must_use]
    pub fn last_event(&self) -> Option<PushEvent> {
        self.inner.last_event.borrow().clone()
    }

    /// Watch the most-recent-event cell.
    #[must_use]
    pub fn watch_last_event(&self) -> watch::Receiver<Option<PushEvent>> {
        self.inner.last_event.subscribe()
    }

    /// Current connection health.
    #[must_use]
    pub fn health(&self) -> ConnectionHealth {
        self.inner.health.borrow().clone()
    }

    /// Watch connection-health transitions.
    #[must_use]
    pub fn watch_health(&self) -> watch::Receiver<ConnectionHealth> {
        self.inner.health.subscribe()
    }

    /// Record a health transition. Normally driven by the stream client;
    /// exposed so tests with a fake event source can steer it too.
    pub fn set_health(&self, connected: bool, error: Option<String>) {
        let _ = self
            .inner
            .health
            .send_replace(ConnectionHealth { connected, error });
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
