//! Connection status derivation and monitoring.

pub mod monitor;
pub mod status;

pub use monitor::ConnectionMonitor;
pub use status::{ConnectionMetrics, ConnectionQuality, ConnectionStatus};
