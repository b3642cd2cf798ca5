//! # trucklog-sync
//!
//! Real-time synchronization layer for the TruckLog client. Provides:
//!
//! - Transport abstraction with interchangeable polling and WebSocket strategies
//! - Connection monitoring with latency-derived quality grading
//! - Channel routing with deduplicated domain subscriptions
//! - Notification store with a persisted read ledger and delivery policy
//! - Rate-limited refresh controllers for the HOS and trip domain caches
//! - Session-scoped typed event bus

pub mod bus;
pub mod channel;
pub mod connection;
pub mod notification;
pub mod refresh;
pub mod state;
pub mod transport;

pub use bus::{EventBus, SyncEvent};
pub use channel::router::ChannelRouter;
pub use channel::types::SyncChannel;
pub use connection::monitor::ConnectionMonitor;
pub use connection::status::{ConnectionQuality, ConnectionStatus};
pub use notification::store::NotificationStore;
pub use refresh::hos::HosRefreshController;
pub use refresh::trips::TripsRefreshController;
pub use transport::polling::PollingTransport;
pub use transport::websocket::WebSocketTransport;
pub use transport::{ChannelMessage, ConnectionState, Transport, TransportEvent};
