//! # trucklog-client
//!
//! Session-scoped client runtime for TruckLog. Wires the backend API client,
//! the chosen transport strategy, connection monitoring, channel routing, the
//! notification store, and the domain refresh controllers into one container
//! created on login and disposed on logout.

pub mod session;

pub use session::SessionContainer;

pub use trucklog_core::config::ClientConfig;
pub use trucklog_core::{AppError, AppResult};
pub use trucklog_entity::hos::HosStatus;
pub use trucklog_entity::notification::{
    Notification, NotificationDraft, NotificationPriority, NotificationSettings, NotificationType,
};
pub use trucklog_entity::trip::TripSummary;
pub use trucklog_sync::{ConnectionStatus, EventBus, SyncChannel, SyncEvent};

use tracing_subscriber::{EnvFilter, fmt};

use trucklog_core::config::logging::LoggingConfig;

/// Initialize tracing/logging for an embedding application.
pub fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            fmt().json().with_env_filter(filter).with_target(true).init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}
