//! Connection monitor — derives a stable status snapshot from raw
//! transport lifecycle events and periodic latency samples.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::debug;

use crate::bus::{EventBus, SyncEvent};
use crate::transport::{ConnectionState, Transport, TransportEvent};

use super::status::{ConnectionMetrics, ConnectionQuality, ConnectionStatus};

/// Raw counters and timestamps accumulated from transport events.
#[derive(Debug, Default)]
struct MonitorState {
    /// Instant of the most recent transition into connected.
    connected_at: Option<Instant>,
    /// Last observed latency sample.
    latency_ms: Option<u64>,
    /// Messages handed to the transport.
    messages_sent: u64,
    /// Channel messages received.
    messages_received: u64,
    /// Reconnections after the initial connect.
    reconnect_attempts: u32,
    /// Most recent transport error.
    last_error: Option<String>,
    /// Wall-clock time of the last connect.
    last_connected: Option<DateTime<Utc>>,
    /// Wall-clock time of the last disconnect.
    last_disconnected: Option<DateTime<Utc>>,
}

/// Turns transport lifecycle events into a consumable status snapshot.
///
/// The monitor only observes: it never retries connections — reconnection is
/// the transport's job.
pub struct ConnectionMonitor {
    /// Observed transport.
    transport: Arc<dyn Transport>,
    /// Session bus for `ConnectionChanged` signals.
    bus: EventBus,
    /// Snapshot recomputation cadence.
    tick: Duration,
    /// Accumulated raw state.
    inner: Arc<Mutex<MonitorState>>,
    /// Event and tick tasks.
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl ConnectionMonitor {
    /// Creates a monitor over the given transport.
    pub fn new(transport: Arc<dyn Transport>, bus: EventBus, tick: Duration) -> Self {
        Self {
            transport,
            bus,
            tick,
            inner: Arc::new(Mutex::new(MonitorState::default())),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Starts the event and tick tasks.
    pub fn start(&self) {
        let mut tasks = Vec::new();

        {
            let mut events = self.transport.events();
            let transport = Arc::clone(&self.transport);
            let inner = Arc::clone(&self.inner);
            let bus = self.bus.clone();
            tasks.push(tokio::spawn(async move {
                loop {
                    match events.recv().await {
                        Ok(event) => {
                            Self::fold_event(&inner, event);
                            Self::publish(&transport, &inner, &bus);
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            debug!(skipped, "Monitor lagged behind transport events");
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            }));
        }

        {
            let transport = Arc::clone(&self.transport);
            let inner = Arc::clone(&self.inner);
            let bus = self.bus.clone();
            let tick = self.tick;
            tasks.push(tokio::spawn(async move {
                let mut interval = time::interval(tick);
                interval.tick().await;
                loop {
                    interval.tick().await;
                    Self::publish(&transport, &inner, &bus);
                }
            }));
        }

        *self.tasks.lock().unwrap_or_else(|e| e.into_inner()) = tasks;
    }

    /// Stops the tasks without resetting accumulated state.
    pub fn shutdown(&self) {
        for task in self
            .tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain(..)
        {
            task.abort();
        }
    }

    /// Restores disconnected defaults. Called on logout/teardown so a new
    /// session never inherits the previous session's counters.
    pub fn reset(&self) {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner()) = MonitorState::default();
    }

    /// Records a message handed to the transport.
    pub fn note_message_sent(&self) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .messages_sent += 1;
    }

    /// Folds one raw transport event into the accumulated state and
    /// publishes the recomputed snapshot.
    pub fn apply(&self, event: TransportEvent) {
        Self::fold_event(&self.inner, event);
        Self::publish(&self.transport, &self.inner, &self.bus);
    }

    /// Computes the current status snapshot.
    pub fn snapshot(&self) -> ConnectionStatus {
        Self::compute(&self.transport, &self.inner)
    }

    fn fold_event(inner: &Mutex<MonitorState>, event: TransportEvent) {
        let mut inner = inner.lock().unwrap_or_else(|e| e.into_inner());
        match event {
            TransportEvent::Connected => {
                // Uptime restarts on every transition into connected,
                // not only the first.
                inner.connected_at = Some(Instant::now());
                inner.last_connected = Some(Utc::now());
                if inner.last_disconnected.is_some() {
                    inner.reconnect_attempts += 1;
                }
                inner.last_error = None;
            }
            TransportEvent::Disconnected { reason } => {
                inner.connected_at = None;
                inner.last_disconnected = Some(Utc::now());
                if let Some(reason) = reason {
                    inner.last_error = Some(reason);
                }
            }
            TransportEvent::Error { message } => {
                inner.last_error = Some(message);
            }
            TransportEvent::Latency { ms } => {
                inner.latency_ms = Some(ms);
            }
            TransportEvent::Message(_) => {
                inner.messages_received += 1;
            }
        }
    }

    fn compute(transport: &Arc<dyn Transport>, inner: &Mutex<MonitorState>) -> ConnectionStatus {
        let state = transport.state();
        let inner = inner.lock().unwrap_or_else(|e| e.into_inner());

        let is_connected = state == ConnectionState::Connected;
        let is_connecting = state == ConnectionState::Connecting;
        let is_reconnecting = inner.last_disconnected.is_some() && !is_connected;

        let uptime_ms = if is_connected {
            inner
                .connected_at
                .map(|at| at.elapsed().as_millis() as u64)
                .unwrap_or(0)
        } else {
            0
        };

        let quality = if is_connected {
            // No sample yet reads as good rather than a false extreme.
            inner
                .latency_ms
                .map(ConnectionQuality::from_latency)
                .unwrap_or(ConnectionQuality::Good)
        } else {
            ConnectionQuality::Disconnected
        };

        ConnectionStatus {
            is_connected,
            is_connecting,
            is_reconnecting,
            last_error: inner.last_error.clone(),
            metrics: ConnectionMetrics {
                uptime_ms,
                latency_ms: inner.latency_ms,
                messages_sent: inner.messages_sent,
                messages_received: inner.messages_received,
                reconnect_attempts: inner.reconnect_attempts,
                quality,
                last_connected: inner.last_connected,
                last_disconnected: inner.last_disconnected,
            },
        }
    }

    fn publish(transport: &Arc<dyn Transport>, inner: &Mutex<MonitorState>, bus: &EventBus) {
        bus.publish(SyncEvent::ConnectionChanged(Self::compute(transport, inner)));
    }
}
