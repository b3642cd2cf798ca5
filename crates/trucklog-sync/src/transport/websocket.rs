//! WebSocket transport strategy.
//!
//! Speaks the backend's `{"type": ..., "data": ...}` frame protocol:
//! `subscribe`/`unsubscribe`/`ping` outbound, `notification`/`trip_update`/
//! `hos_update`/`pong`/`error` inbound. Latency is sampled from the
//! application-level ping round trip.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

use crate::channel::types::SyncChannel;

use super::{ChannelMessage, ConnectionState, Transport, TransportEvent};

/// WebSocket-based transport.
pub struct WebSocketTransport {
    /// WebSocket endpoint URL.
    url: String,
    /// Application-level ping cadence.
    ping_interval: Duration,
    /// Current lifecycle state.
    state: Arc<Mutex<ConnectionState>>,
    /// Wire subscription bookkeeping.
    channels: Arc<Mutex<HashSet<String>>>,
    /// Event fan-out.
    events: broadcast::Sender<TransportEvent>,
    /// Outbound frame queue, present while connected.
    writer: Arc<Mutex<Option<mpsc::Sender<String>>>>,
    /// Reader/writer/ping tasks.
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl WebSocketTransport {
    /// Create a WebSocket transport.
    pub fn new(url: impl Into<String>, ping_interval: Duration, event_buffer: usize) -> Self {
        let (events, _) = broadcast::channel(event_buffer);
        Self {
            url: url.into(),
            ping_interval,
            state: Arc::new(Mutex::new(ConnectionState::Disconnected)),
            channels: Arc::new(Mutex::new(HashSet::new())),
            events,
            writer: Arc::new(Mutex::new(None)),
            tasks: Mutex::new(Vec::new()),
        }
    }

    fn set_state(state: &Arc<Mutex<ConnectionState>>, next: ConnectionState) {
        *state.lock().unwrap_or_else(|e| e.into_inner()) = next;
    }

    fn get_state(state: &Arc<Mutex<ConnectionState>>) -> ConnectionState {
        *state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn frame(frame_type: &str, data: serde_json::Value) -> String {
        serde_json::json!({ "type": frame_type, "data": data }).to_string()
    }

    fn queue_frame(writer: &Arc<Mutex<Option<mpsc::Sender<String>>>>, frame: String) -> bool {
        let guard = writer.lock().unwrap_or_else(|e| e.into_inner());
        match guard.as_ref() {
            Some(tx) => tx.try_send(frame).is_ok(),
            None => false,
        }
    }

    /// Map an inbound frame to transport events.
    fn handle_frame(
        text: &str,
        events: &broadcast::Sender<TransportEvent>,
        last_ping: &Arc<Mutex<Option<Instant>>>,
    ) {
        let value: serde_json::Value = match serde_json::from_str(text) {
            Ok(v) => v,
            Err(e) => {
                debug!(error = %e, "Discarding malformed frame");
                return;
            }
        };

        let frame_type = value.get("type").and_then(|t| t.as_str()).unwrap_or("");
        let data = value.get("data").cloned().unwrap_or(serde_json::Value::Null);

        match frame_type {
            "pong" => {
                let sent = last_ping.lock().unwrap_or_else(|e| e.into_inner()).take();
                if let Some(sent) = sent {
                    let _ = events.send(TransportEvent::Latency {
                        ms: sent.elapsed().as_millis() as u64,
                    });
                }
            }
            "notification" => {
                let _ = events.send(TransportEvent::Message(ChannelMessage {
                    channel: SyncChannel::Notifications.name(),
                    payload: data,
                }));
            }
            "trip_update" => {
                let channel = data
                    .get("trip_id")
                    .and_then(|id| id.as_i64())
                    .map(|id| SyncChannel::Trip(id).name())
                    .unwrap_or_else(|| SyncChannel::TripUpdates.name());
                let _ = events.send(TransportEvent::Message(ChannelMessage {
                    channel,
                    payload: data,
                }));
            }
            "hos_update" => {
                let _ = events.send(TransportEvent::Message(ChannelMessage {
                    channel: SyncChannel::HosUpdates.name(),
                    payload: data,
                }));
            }
            "error" => {
                let message = data
                    .get("message")
                    .and_then(|m| m.as_str())
                    .unwrap_or("unknown server error")
                    .to_string();
                let _ = events.send(TransportEvent::Error { message });
            }
            "connection_established" | "subscribed" | "unsubscribed" => {
                debug!(frame_type, "Server acknowledgement");
            }
            other => {
                debug!(frame_type = other, "Ignoring unknown frame type");
            }
        }
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn connect(&self) {
        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if *state != ConnectionState::Disconnected {
                return;
            }
            *state = ConnectionState::Connecting;
        }

        let stream = match connect_async(self.url.as_str()).await {
            Ok((stream, _)) => stream,
            Err(e) => {
                let message = format!("WebSocket connect failed: {e}");
                warn!(url = %self.url, error = %e, "WebSocket connect failed");
                let _ = self.events.send(TransportEvent::Error {
                    message: message.clone(),
                });
                Self::set_state(&self.state, ConnectionState::Disconnected);
                let _ = self.events.send(TransportEvent::Disconnected {
                    reason: Some(message),
                });
                return;
            }
        };

        let (mut sink, mut reader) = stream.split();
        let (tx, mut rx) = mpsc::channel::<String>(64);
        *self.writer.lock().unwrap_or_else(|e| e.into_inner()) = Some(tx);

        let last_ping: Arc<Mutex<Option<Instant>>> = Arc::new(Mutex::new(None));
        let mut tasks = Vec::new();

        // Writer: drain queued frames into the socket.
        tasks.push(tokio::spawn(async move {
            while let Some(frame) = rx.recv().await {
                if sink.send(Message::Text(frame.into())).await.is_err() {
                    break;
                }
            }
        }));

        // Reader: fan inbound frames out as events; a closed socket is an
        // unplanned drop.
        {
            let events = self.events.clone();
            let state = Arc::clone(&self.state);
            let writer = Arc::clone(&self.writer);
            let last_ping = Arc::clone(&last_ping);
            tasks.push(tokio::spawn(async move {
                while let Some(message) = reader.next().await {
                    match message {
                        Ok(Message::Text(text)) => {
                            Self::handle_frame(text.as_str(), &events, &last_ping);
                        }
                        Ok(Message::Close(_)) | Err(_) => break,
                        Ok(_) => {}
                    }
                }
                *writer.lock().unwrap_or_else(|e| e.into_inner()) = None;
                if Self::get_state(&state) == ConnectionState::Connected {
                    Self::set_state(&state, ConnectionState::Disconnected);
                    let _ = events.send(TransportEvent::Disconnected {
                        reason: Some("connection closed".to_string()),
                    });
                }
            }));
        }

        // Ping: application-level keepalive doubling as the latency probe.
        {
            let writer = Arc::clone(&self.writer);
            let last_ping = Arc::clone(&last_ping);
            let ping_interval = self.ping_interval;
            tasks.push(tokio::spawn(async move {
                let mut interval = time::interval(ping_interval);
                interval.tick().await;
                loop {
                    interval.tick().await;
                    let frame = Self::frame(
                        "ping",
                        serde_json::json!({ "timestamp": chrono::Utc::now().timestamp_millis() }),
                    );
                    if !Self::queue_frame(&writer, frame) {
                        break;
                    }
                    *last_ping.lock().unwrap_or_else(|e| e.into_inner()) = Some(Instant::now());
                }
            }));
        }

        *self.tasks.lock().unwrap_or_else(|e| e.into_inner()) = tasks;

        Self::set_state(&self.state, ConnectionState::Connected);
        let _ = self.events.send(TransportEvent::Connected);

        // Replay wire subscriptions established before (re)connecting.
        let channels: Vec<String> = self
            .channels
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect();
        for channel in channels {
            let frame = Self::frame("subscribe", serde_json::json!({ "channel": channel }));
            Self::queue_frame(&self.writer, frame);
        }

        debug!(url = %self.url, "WebSocket connected");
    }

    async fn disconnect(&self) {
        let tasks: Vec<JoinHandle<()>> = self
            .tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain(..)
            .collect();
        let was_disconnected = Self::get_state(&self.state) == ConnectionState::Disconnected;
        if tasks.is_empty() && was_disconnected {
            return;
        }

        for task in tasks {
            task.abort();
        }
        *self.writer.lock().unwrap_or_else(|e| e.into_inner()) = None;
        self.channels
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        Self::set_state(&self.state, ConnectionState::Disconnected);
        let _ = self
            .events
            .send(TransportEvent::Disconnected { reason: None });
        debug!("WebSocket transport disconnected");
    }

    async fn send(&self, message: serde_json::Value) -> bool {
        if Self::get_state(&self.state) != ConnectionState::Connected {
            return false;
        }
        Self::queue_frame(&self.writer, message.to_string())
    }

    async fn subscribe(&self, channel: &str) {
        let newly_added = self
            .channels
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(channel.to_string());
        if newly_added && Self::get_state(&self.state) == ConnectionState::Connected {
            let frame = Self::frame("subscribe", serde_json::json!({ "channel": channel }));
            Self::queue_frame(&self.writer, frame);
        }
    }

    async fn unsubscribe(&self, channel: &str) {
        let was_present = self
            .channels
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(channel);
        if was_present && Self::get_state(&self.state) == ConnectionState::Connected {
            let frame = Self::frame("unsubscribe", serde_json::json!({ "channel": channel }));
            Self::queue_frame(&self.writer, frame);
        }
    }

    fn state(&self) -> ConnectionState {
        Self::get_state(&self.state)
    }

    fn events(&self) -> broadcast::Receiver<TransportEvent> {
        self.events.subscribe()
    }
}
