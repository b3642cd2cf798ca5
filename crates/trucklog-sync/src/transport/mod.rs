//! Transport abstraction over interchangeable connection strategies.
//!
//! The contract is identical whether the concrete transport is a persistent
//! WebSocket or an interval poll loop; the rest of the system never branches
//! on the strategy.

pub mod polling;
pub mod websocket;

use async_trait::async_trait;
use tokio::sync::broadcast;

/// Logical connection state.
///
/// Legal transitions: `Disconnected → Connecting → Connected → Disconnected`,
/// plus `Connecting → Disconnected` on failure. A dropped connection always
/// passes through `Disconnected` before the next `Connecting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection and no attempt in progress.
    Disconnected,
    /// A connection attempt is in progress.
    Connecting,
    /// The transport is live.
    Connected,
}

impl ConnectionState {
    /// Convert to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        }
    }
}

/// A domain event received on a subscribed channel.
#[derive(Debug, Clone)]
pub struct ChannelMessage {
    /// Channel name the event arrived on.
    pub channel: String,
    /// Event payload.
    pub payload: serde_json::Value,
}

/// Lifecycle and data events emitted by a transport.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// The transport reached the connected state.
    Connected,
    /// The transport left the connected state, or a connect attempt failed.
    Disconnected {
        /// Failure description, absent on an orderly disconnect.
        reason: Option<String>,
    },
    /// A transport-level failure. Never thrown to callers.
    Error {
        /// Failure description.
        message: String,
    },
    /// A domain event arrived on a subscribed channel.
    Message(ChannelMessage),
    /// A round-trip latency sample.
    Latency {
        /// Observed latency in milliseconds.
        ms: u64,
    },
}

/// A logical connection to the backend event surface.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Establish the connection. Idempotent: a no-op unless currently
    /// disconnected. Never returns an error; failures surface as an
    /// `Error` event followed by `Disconnected`, so the caller always
    /// observes a terminal lifecycle event.
    async fn connect(&self);

    /// Tear down the connection, stop background activity, and clear wire
    /// subscription bookkeeping. Idempotent.
    async fn disconnect(&self);

    /// Hand a message to the transport, fire-and-forget. Returns whether it
    /// was accepted (not a delivery guarantee).
    async fn send(&self, message: serde_json::Value) -> bool;

    /// Subscribe to a channel. Safe to call redundantly.
    async fn subscribe(&self, channel: &str);

    /// Unsubscribe from a channel. Idempotent.
    async fn unsubscribe(&self, channel: &str);

    /// Current connection state.
    fn state(&self) -> ConnectionState;

    /// Subscribe to lifecycle and data events.
    fn events(&self) -> broadcast::Receiver<TransportEvent>;
}
