//! Real-time transport and connection monitoring configuration.

use serde::{Deserialize, Serialize};

/// Transport strategy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// Interval polling against the backend event endpoint.
    #[default]
    Polling,
    /// Persistent WebSocket connection.
    Websocket,
}

/// Real-time synchronization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Which transport strategy to use.
    #[serde(default)]
    pub transport: TransportKind,
    /// WebSocket endpoint URL (used by the websocket transport).
    #[serde(default = "default_websocket_url")]
    pub websocket_url: String,
    /// Poll interval in seconds (used by the polling transport).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// Connection status recomputation tick in seconds.
    #[serde(default = "default_status_tick")]
    pub status_tick_seconds: u64,
    /// WebSocket ping interval in seconds.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_seconds: u64,
    /// Internal event channel buffer size.
    #[serde(default = "default_event_buffer")]
    pub event_buffer_size: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            transport: TransportKind::default(),
            websocket_url: default_websocket_url(),
            poll_interval_seconds: default_poll_interval(),
            status_tick_seconds: default_status_tick(),
            ping_interval_seconds: default_ping_interval(),
            event_buffer_size: default_event_buffer(),
        }
    }
}

fn default_websocket_url() -> String {
    "ws://localhost:8000/ws/notifications/".to_string()
}

fn default_poll_interval() -> u64 {
    10
}

fn default_status_tick() -> u64 {
    5
}

fn default_ping_interval() -> u64 {
    30
}

fn default_event_buffer() -> usize {
    256
}
