//! Session-scoped typed event bus.
//!
//! Consumers subscribe explicitly instead of listening on an ambient
//! broadcast channel; payloads are the closed [`SyncEvent`] set.

use tokio::sync::broadcast;

use trucklog_entity::hos::HosStatus;
use trucklog_entity::notification::Notification;
use trucklog_entity::trip::TripSummary;

use crate::connection::status::ConnectionStatus;

/// Events published to the presentation layer.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// A notification was stored and delivered.
    NotificationArrived(Notification),
    /// The notification set changed (dismissal, read state, backend reload).
    NotificationsChanged,
    /// The HOS status cache was replaced.
    HosStatusChanged(HosStatus),
    /// A single trip was updated in place.
    TripUpdated {
        /// Server row id of the updated trip.
        trip_id: i64,
    },
    /// The trip list cache was replaced.
    TripsChanged(Vec<TripSummary>),
    /// The connection status snapshot was recomputed.
    ConnectionChanged(ConnectionStatus),
}

/// Broadcast bus owned by the session container.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SyncEvent>,
}

impl EventBus {
    /// Create a bus with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.tx.subscribe()
    }

    /// Publish an event. Publishing with no subscribers is not an error.
    pub fn publish(&self, event: SyncEvent) {
        let _ = self.tx.send(event);
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
