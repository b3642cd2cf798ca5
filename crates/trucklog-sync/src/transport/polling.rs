//! Interval-polling transport strategy.
//!
//! Stands in for a persistent connection: "connected" means the poll loop is
//! live, and events returned by the poll endpoint fan out as channel
//! messages. Reconnection after a failed poll is the transport's own job and
//! follows the legal `Disconnected → Connecting → Connected` path.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, warn};

use trucklog_api::PollApi;

use super::{ChannelMessage, ConnectionState, Transport, TransportEvent};

/// Polling-based transport.
pub struct PollingTransport {
    /// Backend poll surface.
    api: Arc<dyn PollApi>,
    /// Interval between polls.
    poll_interval: Duration,
    /// Current lifecycle state.
    state: Arc<Mutex<ConnectionState>>,
    /// Wire subscription bookkeeping.
    channels: Arc<Mutex<HashSet<String>>>,
    /// Event fan-out.
    events: broadcast::Sender<TransportEvent>,
    /// Poll loop task.
    task: Mutex<Option<JoinHandle<()>>>,
}

impl PollingTransport {
    /// Create a polling transport.
    pub fn new(api: Arc<dyn PollApi>, poll_interval: Duration, event_buffer: usize) -> Self {
        let (events, _) = broadcast::channel(event_buffer);
        Self {
            api,
            poll_interval,
            state: Arc::new(Mutex::new(ConnectionState::Disconnected)),
            channels: Arc::new(Mutex::new(HashSet::new())),
            events,
            task: Mutex::new(None),
        }
    }

    fn set_state(state: &Arc<Mutex<ConnectionState>>, next: ConnectionState) {
        *state.lock().unwrap_or_else(|e| e.into_inner()) = next;
    }

    fn get_state(state: &Arc<Mutex<ConnectionState>>) -> ConnectionState {
        *state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn snapshot_channels(channels: &Arc<Mutex<HashSet<String>>>) -> Vec<String> {
        let mut list: Vec<String> = channels
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect();
        list.sort();
        list
    }

    /// One poll round: fetch pending events, emit them, and keep the state
    /// machine honest about recoveries and drops.
    async fn poll_once(
        api: &Arc<dyn PollApi>,
        state: &Arc<Mutex<ConnectionState>>,
        channels: &Arc<Mutex<HashSet<String>>>,
        events: &broadcast::Sender<TransportEvent>,
    ) {
        // A previous drop leaves the loop in Disconnected; the new attempt
        // is a reconnect and must surface as Connecting first.
        if Self::get_state(state) == ConnectionState::Disconnected {
            Self::set_state(state, ConnectionState::Connecting);
        }

        let list = Self::snapshot_channels(channels);
        let started = Instant::now();

        match api.poll_events(&list).await {
            Ok(polled) => {
                let latency = started.elapsed().as_millis() as u64;
                if Self::get_state(state) != ConnectionState::Connected {
                    Self::set_state(state, ConnectionState::Connected);
                    let _ = events.send(TransportEvent::Connected);
                }
                let _ = events.send(TransportEvent::Latency { ms: latency });
                for event in polled {
                    let _ = events.send(TransportEvent::Message(ChannelMessage {
                        channel: event.channel,
                        payload: event.payload,
                    }));
                }
            }
            Err(e) => {
                let message = e.to_string();
                warn!(error = %message, "Poll failed");
                let _ = events.send(TransportEvent::Error {
                    message: message.clone(),
                });
                if Self::get_state(state) != ConnectionState::Disconnected {
                    Self::set_state(state, ConnectionState::Disconnected);
                    let _ = events.send(TransportEvent::Disconnected {
                        reason: Some(message),
                    });
                }
            }
        }
    }
}

#[async_trait]
impl Transport for PollingTransport {
    async fn connect(&self) {
        // A live poll loop owns reconnection after a dropped poll; a second
        // loop must never be spawned.
        if self
            .task
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
        {
            return;
        }
        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if *state != ConnectionState::Disconnected {
                return;
            }
            *state = ConnectionState::Connecting;
        }

        // Probe poll as the handshake: the caller always observes either
        // Connected or Error + Disconnected.
        let started = Instant::now();
        match self.api.poll_events(&[]).await {
            Ok(_) => {
                let latency = started.elapsed().as_millis() as u64;
                Self::set_state(&self.state, ConnectionState::Connected);
                let _ = self.events.send(TransportEvent::Connected);
                let _ = self.events.send(TransportEvent::Latency { ms: latency });
            }
            Err(e) => {
                let message = e.to_string();
                warn!(error = %message, "Connect probe failed");
                let _ = self.events.send(TransportEvent::Error {
                    message: message.clone(),
                });
                Self::set_state(&self.state, ConnectionState::Disconnected);
                let _ = self.events.send(TransportEvent::Disconnected {
                    reason: Some(message),
                });
                return;
            }
        }

        let api = Arc::clone(&self.api);
        let state = Arc::clone(&self.state);
        let channels = Arc::clone(&self.channels);
        let events = self.events.clone();
        let poll_interval = self.poll_interval;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(poll_interval);
            // The first tick fires immediately and would duplicate the probe.
            interval.tick().await;
            loop {
                interval.tick().await;
                Self::poll_once(&api, &state, &channels, &events).await;
            }
        });

        *self.task.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);
    }

    async fn disconnect(&self) {
        let handle = self.task.lock().unwrap_or_else(|e| e.into_inner()).take();
        let was_disconnected = Self::get_state(&self.state) == ConnectionState::Disconnected;
        if handle.is_none() && was_disconnected {
            return;
        }

        if let Some(handle) = handle {
            handle.abort();
        }
        self.channels
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        Self::set_state(&self.state, ConnectionState::Disconnected);
        let _ = self
            .events
            .send(TransportEvent::Disconnected { reason: None });
        debug!("Polling transport disconnected");
    }

    async fn send(&self, message: serde_json::Value) -> bool {
        if Self::get_state(&self.state) != ConnectionState::Connected {
            return false;
        }
        let api = Arc::clone(&self.api);
        tokio::spawn(async move {
            if let Err(e) = api.publish_event(&message).await {
                debug!(error = %e, "Publish failed");
            }
        });
        true
    }

    async fn subscribe(&self, channel: &str) {
        self.channels
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(channel.to_string());
    }

    async fn unsubscribe(&self, channel: &str) {
        self.channels
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(channel);
    }

    fn state(&self) -> ConnectionState {
        Self::get_state(&self.state)
    }

    fn events(&self) -> broadcast::Receiver<TransportEvent> {
        self.events.subscribe()
    }
}
