//! Channel router — deduplicated domain subscriptions over the transport.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tracing::debug;

use crate::transport::{ConnectionState, Transport, TransportEvent};

use super::types::SyncChannel;

/// Maps domain intents onto transport channel subscriptions.
///
/// The router owns the desired-state subscription set: the transport is never
/// asked to subscribe to the same channel twice, unsubscribe is idempotent,
/// and desired subscriptions recorded while disconnected are (re-)issued
/// whenever the transport reaches the connected state.
pub struct ChannelRouter {
    /// Underlying transport.
    transport: Arc<dyn Transport>,
    /// Desired subscription set, shared with the replay task.
    desired: Arc<Mutex<HashSet<String>>>,
    /// Replay task, live between `start` and `shutdown`.
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ChannelRouter {
    /// Creates a router over the given transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            desired: Arc::new(Mutex::new(HashSet::new())),
            task: Mutex::new(None),
        }
    }

    /// Starts the replay task that re-issues desired subscriptions whenever
    /// the transport (re)connects.
    pub fn start(&self) {
        let transport = Arc::clone(&self.transport);
        let desired = Arc::clone(&self.desired);
        let mut events = self.transport.events();
        let handle = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(TransportEvent::Connected) => {
                        for name in Self::sorted_channels(&desired) {
                            transport.subscribe(&name).await;
                        }
                    }
                    Ok(_) => {}
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        *self.task.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);
    }

    /// Stops the replay task.
    pub fn shutdown(&self) {
        if let Some(handle) = self.task.lock().unwrap_or_else(|e| e.into_inner()).take() {
            handle.abort();
        }
    }

    /// Subscribes to a domain channel. Deduplicated: a redundant call is a
    /// no-op and never reaches the transport.
    pub async fn subscribe(&self, channel: SyncChannel) {
        let name = channel.name();
        let newly_added = self
            .desired
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.clone());
        if !newly_added {
            return;
        }
        debug!(channel = %name, "Subscribed");
        if self.transport.state() == ConnectionState::Connected {
            self.transport.subscribe(&name).await;
        }
    }

    /// Unsubscribes from a domain channel. Idempotent.
    ///
    /// Callers are responsible for invoking this when an entity leaves scope
    /// (e.g., a trip completes); the router never infers it.
    pub async fn unsubscribe(&self, channel: SyncChannel) {
        let name = channel.name();
        let was_present = self
            .desired
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&name);
        if !was_present {
            return;
        }
        debug!(channel = %name, "Unsubscribed");
        self.transport.unsubscribe(&name).await;
    }

    /// Subscribes to the per-trip channel for a trip entering scope.
    pub async fn watch_trip(&self, trip_id: i64) {
        self.subscribe(SyncChannel::Trip(trip_id)).await;
    }

    /// Unsubscribes from the per-trip channel, using the identical name
    /// derivation as `watch_trip`.
    pub async fn unwatch_trip(&self, trip_id: i64) {
        self.unsubscribe(SyncChannel::Trip(trip_id)).await;
    }

    /// The currently desired channel list, sorted for display.
    pub fn subscribed_channels(&self) -> Vec<String> {
        Self::sorted_channels(&self.desired)
    }

    fn sorted_channels(desired: &Mutex<HashSet<String>>) -> Vec<String> {
        let mut list: Vec<String> = desired
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect();
        list.sort();
        list
    }
}
