//! Shared test helpers for integration tests.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use tokio::sync::broadcast;

use trucklog_api::notifications::{BackendNotification, CreateNotification};
use trucklog_api::{HosApi, NotificationApi, TripApi};
use trucklog_client::session::{SessionContainer, SessionParts};
use trucklog_client::ClientConfig;
use trucklog_core::traits::alerts::{AlertSink, Toast};
use trucklog_core::traits::state::StateStore;
use trucklog_core::{AppError, AppResult};
use trucklog_entity::hos::{DutyStatus, HosStatus};
use trucklog_entity::trip::{TripStatus, TripSummary};
use trucklog_sync::state::MemoryStateStore;
use trucklog_sync::transport::{ChannelMessage, ConnectionState, Transport, TransportEvent};

/// Transport driven manually by the test.
pub struct MockTransport {
    state: Mutex<ConnectionState>,
    events: broadcast::Sender<TransportEvent>,
    /// Wire subscription state, set-based like a real transport.
    pub wire_channels: Mutex<HashSet<String>>,
    pub sent: Mutex<Vec<serde_json::Value>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            state: Mutex::new(ConnectionState::Disconnected),
            events,
            wire_channels: Mutex::new(HashSet::new()),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn set_state(&self, state: ConnectionState) {
        *self.state.lock().unwrap() = state;
    }

    pub fn fire_connected(&self) {
        self.set_state(ConnectionState::Connected);
        let _ = self.events.send(TransportEvent::Connected);
    }

    pub fn fire_disconnected(&self, reason: Option<&str>) {
        self.set_state(ConnectionState::Disconnected);
        let _ = self.events.send(TransportEvent::Disconnected {
            reason: reason.map(str::to_string),
        });
    }

    pub fn fire_latency(&self, ms: u64) {
        let _ = self.events.send(TransportEvent::Latency { ms });
    }

    pub fn fire_message(&self, channel: &str, payload: serde_json::Value) {
        let _ = self.events.send(TransportEvent::Message(ChannelMessage {
            channel: channel.to_string(),
            payload,
        }));
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&self) {
        if *self.state.lock().unwrap() != ConnectionState::Disconnected {
            return;
        }
        self.fire_connected();
    }

    async fn disconnect(&self) {
        self.wire_channels.lock().unwrap().clear();
        self.fire_disconnected(None);
    }

    async fn send(&self, message: serde_json::Value) -> bool {
        if *self.state.lock().unwrap() != ConnectionState::Connected {
            return false;
        }
        self.sent.lock().unwrap().push(message);
        true
    }

    async fn subscribe(&self, channel: &str) {
        self.wire_channels.lock().unwrap().insert(channel.to_string());
    }

    async fn unsubscribe(&self, channel: &str) {
        self.wire_channels.lock().unwrap().remove(channel);
    }

    fn state(&self) -> ConnectionState {
        *self.state.lock().unwrap()
    }

    fn events(&self) -> broadcast::Receiver<TransportEvent> {
        self.events.subscribe()
    }
}

/// Backend stub implementing every API surface.
#[derive(Default)]
pub struct MockBackend {
    pub fail_notifications: AtomicBool,
    pub hos_fetches: AtomicUsize,
    pub trip_fetches: AtomicUsize,
    pub rows: Mutex<Vec<BackendNotification>>,
    pub created: Mutex<Vec<CreateNotification>>,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl NotificationApi for MockBackend {
    async fn list_notifications(&self) -> AppResult<Vec<BackendNotification>> {
        if self.fail_notifications.load(Ordering::SeqCst) {
            return Err(AppError::backend("notifications unavailable"));
        }
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn mark_read(&self, _id: i64) -> AppResult<()> {
        if self.fail_notifications.load(Ordering::SeqCst) {
            return Err(AppError::backend("mark_read unavailable"));
        }
        Ok(())
    }

    async fn mark_all_read(&self) -> AppResult<()> {
        if self.fail_notifications.load(Ordering::SeqCst) {
            return Err(AppError::backend("mark_all_read unavailable"));
        }
        Ok(())
    }

    async fn create_notification(&self, req: &CreateNotification) -> AppResult<()> {
        if self.fail_notifications.load(Ordering::SeqCst) {
            return Err(AppError::backend("create unavailable"));
        }
        self.created.lock().unwrap().push(req.clone());
        Ok(())
    }
}

#[async_trait]
impl HosApi for MockBackend {
    async fn fetch_hos_status(&self) -> AppResult<HosStatus> {
        self.hos_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(sample_hos_status())
    }
}

#[async_trait]
impl TripApi for MockBackend {
    async fn fetch_trips(&self) -> AppResult<Vec<TripSummary>> {
        self.trip_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(vec![sample_trip(1, TripStatus::InProgress, 4)])
    }
}

/// Sink recording fired side effects.
#[derive(Default)]
pub struct RecordingSink {
    pub sounds: AtomicUsize,
    pub toasts: Mutex<Vec<Toast>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl AlertSink for RecordingSink {
    async fn play_sound(&self) {
        self.sounds.fetch_add(1, Ordering::SeqCst);
    }

    async fn vibrate(&self, _pattern: &[u64]) {}

    async fn request_permission(&self) -> bool {
        true
    }

    async fn os_notification(&self, _title: &str, _body: &str) -> bool {
        true
    }

    async fn show_toast(&self, toast: Toast) {
        self.toasts.lock().unwrap().push(toast);
    }

    async fn clear_toast(&self, id: &str) {
        self.toasts.lock().unwrap().retain(|t| t.id != id);
    }
}

pub fn sample_hos_status() -> HosStatus {
    HosStatus {
        duty_status: DutyStatus::Driving,
        can_drive: true,
        can_be_on_duty: true,
        needs_rest: false,
        drive_hours_remaining: 7.5,
        duty_hours_remaining: 9.0,
        cycle_hours_remaining: 41.0,
        violations_count: 0,
        compliance_score: 100.0,
        updated_at: Utc::now(),
    }
}

pub fn sample_trip(id: i64, status: TripStatus, ends_in_hours: i64) -> TripSummary {
    let now = Utc::now();
    TripSummary {
        id,
        trip_name: format!("trip-{id}"),
        pickup_location: "Bakersfield, CA".to_string(),
        delivery_location: "Phoenix, AZ".to_string(),
        planned_start_time: now - ChronoDuration::hours(1),
        planned_end_time: now + ChronoDuration::hours(ends_in_hours),
        status,
        hours_available: Some(9.0),
        updated_at: now,
    }
}

pub fn backend_row(id: i64, title: &str) -> BackendNotification {
    BackendNotification {
        id,
        title: title.to_string(),
        message: "body".to_string(),
        notification_type: "info".to_string(),
        priority: Some(1),
        is_read: None,
        created_at: Utc::now(),
        read_at: None,
        data: None,
    }
}

/// Test session wired from mocks. Auto refresh is disabled so the only
/// fetches are the ones the test triggers.
pub async fn build_session(
    transport: Arc<MockTransport>,
    backend: Arc<MockBackend>,
    sink: Arc<RecordingSink>,
) -> SessionContainer {
    let mut config = ClientConfig::default();
    config.refresh.auto_refresh = false;

    SessionContainer::from_parts(
        config,
        SessionParts {
            transport: transport as Arc<dyn Transport>,
            state: Arc::new(MemoryStateStore::new()) as Arc<dyn StateStore>,
            notification_api: Arc::clone(&backend) as Arc<dyn NotificationApi>,
            hos_api: Arc::clone(&backend) as Arc<dyn HosApi>,
            trip_api: backend as Arc<dyn TripApi>,
            sink: sink as Arc<dyn AlertSink>,
        },
    )
    .await
}

/// Yields long enough for spawned dispatch tasks to drain.
pub async fn settle() {
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
}
