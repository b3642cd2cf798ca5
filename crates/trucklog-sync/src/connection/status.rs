//! Connection status snapshot types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latency at or below which the connection grades excellent, in ms.
const EXCELLENT_LATENCY_MS: u64 = 100;
/// Latency at or below which the connection grades good, in ms.
const GOOD_LATENCY_MS: u64 = 500;
/// Latency at or below which the connection grades fair, in ms.
const FAIR_LATENCY_MS: u64 = 1000;

/// Discrete connection quality grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionQuality {
    /// Latency at or below 100 ms.
    Excellent,
    /// Latency at or below 500 ms.
    Good,
    /// Latency at or below 1000 ms.
    Fair,
    /// Latency above 1000 ms.
    Poor,
    /// Not connected; latency samples are disregarded.
    Disconnected,
}

impl ConnectionQuality {
    /// Grade a latency sample.
    pub fn from_latency(ms: u64) -> Self {
        if ms <= EXCELLENT_LATENCY_MS {
            Self::Excellent
        } else if ms <= GOOD_LATENCY_MS {
            Self::Good
        } else if ms <= FAIR_LATENCY_MS {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    /// Convert to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
            Self::Disconnected => "disconnected",
        }
    }
}

/// Connection metrics derived from raw transport events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionMetrics {
    /// Milliseconds since the most recent transition into connected;
    /// zero while disconnected.
    pub uptime_ms: u64,
    /// Last observed round-trip latency in milliseconds.
    pub latency_ms: Option<u64>,
    /// Messages handed to the transport this session.
    pub messages_sent: u64,
    /// Channel messages received this session.
    pub messages_received: u64,
    /// Number of reconnections after the initial connect.
    pub reconnect_attempts: u32,
    /// Quality grade.
    pub quality: ConnectionQuality,
    /// When the transport last reached connected.
    pub last_connected: Option<DateTime<Utc>>,
    /// When the transport last left connected.
    pub last_disconnected: Option<DateTime<Utc>>,
}

/// Stable, human-consumable connection status snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionStatus {
    /// Whether the transport is connected.
    pub is_connected: bool,
    /// Whether a connection attempt is in progress.
    pub is_connecting: bool,
    /// Whether the session was previously connected and is now connecting
    /// or dropped. False on a cold first connect.
    pub is_reconnecting: bool,
    /// Most recent transport error, cleared on a successful connect.
    pub last_error: Option<String>,
    /// Derived metrics.
    pub metrics: ConnectionMetrics,
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self {
            is_connected: false,
            is_connecting: false,
            is_reconnecting: false,
            last_error: None,
            metrics: ConnectionMetrics {
                uptime_ms: 0,
                latency_ms: None,
                messages_sent: 0,
                messages_received: 0,
                reconnect_attempts: 0,
                quality: ConnectionQuality::Disconnected,
                last_connected: None,
                last_disconnected: None,
            },
        }
    }
}
