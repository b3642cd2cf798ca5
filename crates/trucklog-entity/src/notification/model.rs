//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::{NotificationPriority, NotificationType};

/// Id prefix marking records projected from a backend row.
///
/// The id is the sole reconciliation key between local and backend views of
/// the same notification; `backend-` records are the authoritative projection
/// of a server row and are only ever mutated through the read-state ledger.
pub const BACKEND_ID_PREFIX: &str = "backend-";

/// A notification surfaced to the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Unique identifier: locally generated, or `backend-<serverId>`.
    pub id: String,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub message: String,
    /// Classification.
    pub notification_type: NotificationType,
    /// Free-form grouping tag, e.g. `hos_compliance`, `trip_management`.
    pub category: String,
    /// Priority level.
    pub priority: NotificationPriority,
    /// Whether the record survives auto-dismiss timers.
    pub persistent: bool,
    /// Whether this instance should trigger the notification tone.
    pub sound: bool,
    /// Whether this instance should trigger vibration.
    pub vibration: bool,
    /// Whether the backend holds a durable copy of this record.
    ///
    /// Always true for `backend-` records; false for a local record whose
    /// create call has not (yet) succeeded.
    #[serde(default)]
    pub synced: bool,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
    /// Server-side read timestamp, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
    /// Optional action attached to the notification. Not persisted remotely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<NotificationAction>,
}

/// An action the user can take from a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    /// Button label.
    pub label: String,
    /// Route or URL the action navigates to.
    pub url: String,
}

impl Notification {
    /// Whether this record projects a backend row.
    pub fn is_backend(&self) -> bool {
        self.id.starts_with(BACKEND_ID_PREFIX)
    }

    /// The server row id for a backend-origin record.
    pub fn backend_id(&self) -> Option<&str> {
        self.id.strip_prefix(BACKEND_ID_PREFIX)
    }
}

/// Input to `NotificationStore::show` with optional fields left for the
/// store's default resolution.
#[derive(Debug, Clone, Default)]
pub struct NotificationDraft {
    /// Explicit id; generated when absent.
    pub id: Option<String>,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub message: String,
    /// Classification; defaults to `info`.
    pub notification_type: Option<NotificationType>,
    /// Grouping tag; defaults to `general`.
    pub category: Option<String>,
    /// Priority; defaults to `normal`.
    pub priority: Option<NotificationPriority>,
    /// Persistence override; defaults from priority.
    pub persistent: Option<bool>,
    /// Sound override; defaults from priority.
    pub sound: Option<bool>,
    /// Vibration override; defaults from priority.
    pub vibration: Option<bool>,
    /// Optional attached action.
    pub action: Option<NotificationAction>,
}

impl NotificationDraft {
    /// Create a draft with the required content fields.
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        notification_type: NotificationType,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            notification_type: Some(notification_type),
            ..Self::default()
        }
    }

    /// Set the priority.
    pub fn priority(mut self, priority: NotificationPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set the category.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Resolve the draft into a stored record, applying defaults.
    ///
    /// Defaults: generated uuid id, priority `normal`, category `general`,
    /// `persistent` from the resolved priority (urgent only), sound and
    /// vibration from the resolved priority (high and urgent).
    pub fn into_notification(self, now: DateTime<Utc>) -> Notification {
        let priority = self.priority.unwrap_or(NotificationPriority::Normal);
        Notification {
            id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            title: self.title,
            message: self.message,
            notification_type: self.notification_type.unwrap_or(NotificationType::Info),
            category: self.category.unwrap_or_else(|| "general".to_string()),
            priority,
            persistent: self.persistent.unwrap_or(priority.persistent_by_default()),
            sound: self.sound.unwrap_or(priority.alerts_by_default()),
            vibration: self.vibration.unwrap_or(priority.alerts_by_default()),
            synced: false,
            created_at: now,
            read_at: None,
            action: self.action,
        }
    }
}
