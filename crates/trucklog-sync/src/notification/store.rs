//! Notification store — the single source of truth for notification records
//! across local and backend origin.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{debug, warn};

use trucklog_api::notifications::{CreateNotification, NotificationApi};
use trucklog_core::result::AppResult;
use trucklog_core::traits::alerts::AlertSink;
use trucklog_core::traits::state::StateStore;
use trucklog_core::error::AppError;
use trucklog_entity::notification::{Notification, NotificationDraft, NotificationSettings};

use crate::bus::{EventBus, SyncEvent};

use super::delivery::{deliver, plan_delivery};
use super::ledger::ReadLedger;

/// State-store key holding the settings payload.
const SETTINGS_KEY: &str = "notifications.settings";

/// Holds notifications from both local and backend origin, reconciles read
/// state through the persisted ledger, enforces retention, and fans out
/// delivery side effects.
pub struct NotificationStore {
    /// Records ordered oldest to newest. Shared with the fire-and-forget
    /// backend sync tasks.
    records: Arc<Mutex<Vec<Notification>>>,
    /// Persisted read-state ledger.
    ledger: ReadLedger,
    /// User delivery settings.
    settings: Mutex<NotificationSettings>,
    /// Settings persistence.
    state: Arc<dyn StateStore>,
    /// Backend notification surface.
    api: Arc<dyn NotificationApi>,
    /// Host delivery capabilities.
    sink: Arc<dyn AlertSink>,
    /// Session bus.
    bus: EventBus,
}

impl NotificationStore {
    /// Builds the store, loading settings and the read ledger from the
    /// state store. Absent or malformed settings fall back to defaults.
    pub async fn load(
        state: Arc<dyn StateStore>,
        api: Arc<dyn NotificationApi>,
        sink: Arc<dyn AlertSink>,
        bus: EventBus,
    ) -> Self {
        let settings = match state.load(SETTINGS_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!(error = %e, "Discarding malformed notification settings");
                    NotificationSettings::default()
                }
            },
            Ok(None) => NotificationSettings::default(),
            Err(e) => {
                warn!(error = %e, "Failed to load notification settings");
                NotificationSettings::default()
            }
        };

        let ledger = ReadLedger::load(Arc::clone(&state)).await;

        Self {
            records: Arc::new(Mutex::new(Vec::new())),
            ledger,
            settings: Mutex::new(settings),
            state,
            api,
            sink,
            bus,
        }
    }

    /// Stores and delivers a notification described by a draft.
    ///
    /// Returns the stored record. The caller is never blocked on backend
    /// sync, which runs fire-and-forget.
    pub async fn show(&self, draft: NotificationDraft) -> Notification {
        self.show_record(draft.into_notification(Utc::now())).await
    }

    /// Stores and delivers an already resolved record.
    ///
    /// Locally created records are POSTed to the backend for durability;
    /// `backend-` records were just loaded *from* the backend and are not
    /// echoed back. A sync failure keeps the local record (flagged
    /// unsynced) and is only logged.
    pub async fn show_record(&self, notification: Notification) -> Notification {
        self.upsert(notification.clone());

        if !notification.is_backend() && !notification.synced {
            let api = Arc::clone(&self.api);
            let records = Arc::clone(&self.records);
            let record = notification.clone();
            tokio::spawn(async move {
                match api.create_notification(&CreateNotification::from(&record)).await {
                    Ok(()) => {
                        let mut records = records.lock().unwrap_or_else(|e| e.into_inner());
                        if let Some(stored) = records.iter_mut().find(|n| n.id == record.id) {
                            stored.synced = true;
                        }
                    }
                    Err(e) => {
                        warn!(id = %record.id, error = %e, "Backend notification sync failed");
                    }
                }
            });
        }

        let settings = self.settings();
        let plan = plan_delivery(&notification, &settings, chrono::Local::now().time());
        deliver(plan, &notification, self.sink.as_ref()).await;

        self.bus
            .publish(SyncEvent::NotificationArrived(notification.clone()));
        notification
    }

    /// Removes a record and clears its toast.
    pub async fn dismiss(&self, id: &str) {
        let removed = {
            let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
            let before = records.len();
            records.retain(|n| n.id != id);
            records.len() != before
        };
        if removed {
            self.sink.clear_toast(id).await;
            self.bus.publish(SyncEvent::NotificationsChanged);
        }
    }

    /// Removes every record and clears all toasts.
    pub async fn dismiss_all(&self) {
        let ids: Vec<String> = {
            let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
            records.drain(..).map(|n| n.id).collect()
        };
        for id in &ids {
            self.sink.clear_toast(id).await;
        }
        if !ids.is_empty() {
            self.bus.publish(SyncEvent::NotificationsChanged);
        }
    }

    /// Dismisses every record in a category (e.g. a "Clear HOS" bulk action).
    pub async fn clear_by_category(&self, category: &str) {
        let ids: Vec<String> = {
            let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
            let ids = records
                .iter()
                .filter(|n| n.category == category)
                .map(|n| n.id.clone())
                .collect();
            records.retain(|n| n.category != category);
            ids
        };
        for id in &ids {
            self.sink.clear_toast(id).await;
        }
        if !ids.is_empty() {
            self.bus.publish(SyncEvent::NotificationsChanged);
        }
    }

    /// Marks one notification read.
    ///
    /// Backend-origin ids call the backend first and only enter the ledger
    /// on success, so local read state never drifts ahead of the server.
    /// Local-origin ids enter the ledger unconditionally.
    pub async fn mark_as_read(&self, id: &str) -> AppResult<()> {
        let record = self
            .get(id)
            .ok_or_else(|| AppError::not_found(format!("Unknown notification: {id}")))?;

        if let Some(server_id) = record.backend_id() {
            let server_id: i64 = server_id.parse().map_err(|_| {
                AppError::internal(format!("Malformed backend notification id: {id}"))
            })?;
            self.api.mark_read(server_id).await?;
        }

        self.ledger.mark(id).await;
        self.bus.publish(SyncEvent::NotificationsChanged);
        Ok(())
    }

    /// Marks every known notification read. Backend call first; on failure
    /// local state is left unchanged rather than optimistically marked.
    pub async fn mark_all_as_read(&self) -> AppResult<()> {
        self.api.mark_all_read().await?;

        let ids: Vec<String> = {
            let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
            records.iter().map(|n| n.id.clone()).collect()
        };
        self.ledger.mark_many(ids).await;
        self.bus.publish(SyncEvent::NotificationsChanged);
        Ok(())
    }

    /// Replaces backend-origin projections with the server list.
    ///
    /// The backend is authoritative for content; the read ledger stays
    /// authoritative for read state, with server-side read markers merged
    /// in. Local records (synced or not) are left in place. Returns the
    /// number of rows loaded.
    pub async fn load_from_backend(&self) -> AppResult<usize> {
        let rows = self.api.list_notifications().await?;
        let count = rows.len();

        let mut read_ids = Vec::new();
        {
            let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
            for row in rows {
                let read = row.is_read();
                let notification = row.into_notification();
                if read {
                    read_ids.push(notification.id.clone());
                }
                match records.iter_mut().find(|n| n.id == notification.id) {
                    Some(existing) => *existing = notification,
                    None => records.push(notification),
                }
            }
            let max = self.settings().max_stored;
            Self::enforce_retention(&mut records, max);
        }

        self.ledger.mark_many(read_ids).await;
        self.bus.publish(SyncEvent::NotificationsChanged);
        debug!(count, "Loaded notifications from backend");
        Ok(count)
    }

    /// Every stored record, newest first.
    pub fn get_all(&self) -> Vec<Notification> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.iter().rev().cloned().collect()
    }

    /// One record by id.
    pub fn get(&self, id: &str) -> Option<Notification> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.iter().find(|n| n.id == id).cloned()
    }

    /// Unread records, newest first. A record is read iff its id is in the
    /// ledger; local records with no read concept stay unread until
    /// dismissed.
    pub fn get_unread(&self) -> Vec<Notification> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records
            .iter()
            .rev()
            .filter(|n| !self.ledger.contains(&n.id))
            .cloned()
            .collect()
    }

    /// Unread count.
    pub fn unread_count(&self) -> usize {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records
            .iter()
            .filter(|n| !self.ledger.contains(&n.id))
            .count()
    }

    /// Records at or above the priority-filter setting, newest first.
    /// The filter restricts display only; storage is never filtered.
    pub fn get_visible(&self) -> Vec<Notification> {
        let minimum = self.settings().priority_filter;
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records
            .iter()
            .rev()
            .filter(|n| n.priority >= minimum)
            .cloned()
            .collect()
    }

    /// Current settings snapshot.
    pub fn settings(&self) -> NotificationSettings {
        self.settings
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Mutates the settings and persists them. A persistence failure keeps
    /// the in-memory settings and is only logged.
    pub async fn update_settings<F>(&self, mutate: F)
    where
        F: FnOnce(&mut NotificationSettings),
    {
        let snapshot = {
            let mut settings = self.settings.lock().unwrap_or_else(|e| e.into_inner());
            mutate(&mut settings);
            settings.clone()
        };

        match serde_json::to_string(&snapshot) {
            Ok(payload) => {
                if let Err(e) = self.state.save(SETTINGS_KEY, &payload).await {
                    warn!(error = %e, "Failed to persist notification settings");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize notification settings"),
        }
    }

    /// Requests OS notification permission through the sink and records the
    /// outcome in the settings.
    pub async fn request_os_permission(&self) -> bool {
        let granted = self.sink.request_permission().await;
        self.update_settings(|s| s.os_permission_granted = granted)
            .await;
        granted
    }

    /// Handles a pushed notification event from the transport.
    pub async fn handle_channel_message(&self, payload: &serde_json::Value) {
        match serde_json::from_value::<trucklog_api::BackendNotification>(payload.clone()) {
            Ok(row) => {
                let read = row.is_read();
                let notification = row.into_notification();
                if read {
                    self.ledger.mark(&notification.id).await;
                }
                self.show_record(notification).await;
            }
            Err(e) => {
                warn!(error = %e, "Discarding malformed notification event");
            }
        }
    }

    /// Last-write-wins upsert by id, then retention. Ledger entries are
    /// never touched here, so a re-shown id keeps its read state.
    fn upsert(&self, notification: Notification) {
        let max = self.settings().max_stored;
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        match records.iter_mut().find(|n| n.id == notification.id) {
            Some(existing) => *existing = notification,
            None => records.push(notification),
        }
        Self::enforce_retention(&mut records, max);
    }

    /// Evicts oldest records beyond the configured cap.
    fn enforce_retention(records: &mut Vec<Notification>, max: usize) {
        if records.len() > max {
            let excess = records.len() - max;
            records.drain(..excess);
        }
    }
}
