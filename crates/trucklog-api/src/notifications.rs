//! Notification endpoints: list, mark read, create.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use trucklog_core::result::AppResult;
use trucklog_entity::notification::{
    BACKEND_ID_PREFIX, Notification, NotificationPriority, NotificationType,
};

use crate::client::ApiClient;

/// Known extension fields carried in a notification's `data` record.
///
/// The backend may attach additional keys; unknown keys are ignored and
/// absent keys fall back to priority-derived defaults when projecting into
/// a [`Notification`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationData {
    /// Grouping tag, e.g. `hos_compliance`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Persistence hint set at creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistent: Option<bool>,
    /// Sound hint set at creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound: Option<bool>,
    /// Vibration hint set at creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vibration: Option<bool>,
}

/// A notification row as returned by the backend list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendNotification {
    /// Server row id.
    pub id: i64,
    /// Title.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Type string.
    pub notification_type: String,
    /// Integer priority level (higher is more important).
    #[serde(default)]
    pub priority: Option<u8>,
    /// Whether the server considers the row read.
    #[serde(default)]
    pub is_read: Option<bool>,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
    /// When the row was read, if ever.
    #[serde(default)]
    pub read_at: Option<DateTime<Utc>>,
    /// Extension fields.
    #[serde(default)]
    pub data: Option<NotificationData>,
}

impl BackendNotification {
    /// Whether the server has marked this row read.
    pub fn is_read(&self) -> bool {
        self.is_read.unwrap_or(false) || self.read_at.is_some()
    }

    /// Project the row into the client's authoritative `backend-` record.
    pub fn into_notification(self) -> Notification {
        let priority = self
            .priority
            .map(NotificationPriority::from_level)
            .unwrap_or(NotificationPriority::Normal);
        let data = self.data.unwrap_or_default();
        Notification {
            id: format!("{BACKEND_ID_PREFIX}{}", self.id),
            title: self.title,
            message: self.message,
            notification_type: NotificationType::from_str_value(&self.notification_type),
            category: data.category.unwrap_or_else(|| "general".to_string()),
            priority,
            persistent: data.persistent.unwrap_or(priority.persistent_by_default()),
            sound: data.sound.unwrap_or(priority.alerts_by_default()),
            vibration: data.vibration.unwrap_or(priority.alerts_by_default()),
            synced: true,
            created_at: self.created_at,
            read_at: self.read_at,
            action: None,
        }
    }
}

/// Creation payload for persisting a locally shown notification.
#[derive(Debug, Clone, Serialize)]
pub struct CreateNotification {
    /// Title.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Type string.
    pub notification_type: String,
    /// Integer priority level.
    pub priority: u8,
    /// Extension fields.
    pub data: NotificationData,
}

impl From<&Notification> for CreateNotification {
    fn from(n: &Notification) -> Self {
        Self {
            title: n.title.clone(),
            message: n.message.clone(),
            notification_type: n.notification_type.as_str().to_string(),
            priority: n.priority.level(),
            data: NotificationData {
                category: Some(n.category.clone()),
                persistent: Some(n.persistent),
                sound: Some(n.sound),
                vibration: Some(n.vibration),
            },
        }
    }
}

/// Backend notification operations.
#[async_trait]
pub trait NotificationApi: Send + Sync {
    /// Fetch the notification list for the authenticated user.
    async fn list_notifications(&self) -> AppResult<Vec<BackendNotification>>;

    /// Mark one notification read. Idempotent server-side.
    async fn mark_read(&self, id: i64) -> AppResult<()>;

    /// Mark every notification read.
    async fn mark_all_read(&self) -> AppResult<()>;

    /// Persist a locally created notification.
    async fn create_notification(&self, req: &CreateNotification) -> AppResult<()>;
}

#[async_trait]
impl NotificationApi for ApiClient {
    async fn list_notifications(&self) -> AppResult<Vec<BackendNotification>> {
        self.get_json("notifications/").await
    }

    async fn mark_read(&self, id: i64) -> AppResult<()> {
        self.post_empty(&format!("notifications/{id}/mark_read/"))
            .await
    }

    async fn mark_all_read(&self) -> AppResult<()> {
        self.post_empty("notifications/mark_all_read/").await
    }

    async fn create_notification(&self, req: &CreateNotification) -> AppResult<()> {
        self.post_json("notifications/", req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_defaults_from_priority() {
        let row = BackendNotification {
            id: 7,
            title: "Cycle limit".to_string(),
            message: "2 hours left in cycle".to_string(),
            notification_type: "hos_violation".to_string(),
            priority: Some(3),
            is_read: None,
            created_at: Utc::now(),
            read_at: None,
            data: None,
        };
        let n = row.into_notification();
        assert_eq!(n.id, "backend-7");
        assert_eq!(n.priority, NotificationPriority::Urgent);
        assert!(n.persistent);
        assert!(n.sound);
        assert_eq!(n.category, "general");
        assert!(n.synced);
    }

    #[test]
    fn test_projection_honors_data_hints() {
        let row = BackendNotification {
            id: 8,
            title: "Trip assigned".to_string(),
            message: "Reno run starts at 06:00".to_string(),
            notification_type: "trip_update".to_string(),
            priority: Some(1),
            is_read: Some(true),
            created_at: Utc::now(),
            read_at: None,
            data: Some(NotificationData {
                category: Some("trip_management".to_string()),
                persistent: Some(true),
                sound: Some(false),
                vibration: None,
            }),
        };
        assert!(row.is_read());
        let n = row.into_notification();
        assert_eq!(n.category, "trip_management");
        assert!(n.persistent);
        assert!(!n.sound);
        assert!(!n.vibration);
    }

    #[test]
    fn test_unknown_data_keys_ignored() {
        let json = serde_json::json!({
            "id": 9,
            "title": "t",
            "message": "m",
            "notification_type": "info",
            "created_at": "2026-08-01T12:00:00Z",
            "data": {"category": "general", "related_object_type": "trip", "related_object_id": 4}
        });
        let row: BackendNotification = serde_json::from_value(json).unwrap();
        assert_eq!(row.data.unwrap().category.as_deref(), Some("general"));
    }
}
