//! Notification domain entities.

pub mod model;
pub mod settings;
pub mod types;

pub use model::{BACKEND_ID_PREFIX, Notification, NotificationAction, NotificationDraft};
pub use settings::{NotificationSettings, QuietHours};
pub use types::{NotificationPriority, NotificationType};
