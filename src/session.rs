//! Session container — explicit construction and teardown of every
//! sync-layer service, one container per authenticated session.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use trucklog_api::{ApiClient, HosApi, NotificationApi, PollApi, TripApi};
use trucklog_core::config::ClientConfig;
use trucklog_core::config::sync::TransportKind;
use trucklog_core::result::AppResult;
use trucklog_core::traits::alerts::AlertSink;
use trucklog_core::traits::state::StateStore;
use trucklog_sync::bus::{EventBus, SyncEvent};
use trucklog_sync::channel::router::ChannelRouter;
use trucklog_sync::channel::types::SyncChannel;
use trucklog_sync::connection::monitor::ConnectionMonitor;
use trucklog_sync::connection::status::ConnectionStatus;
use trucklog_sync::notification::store::NotificationStore;
use trucklog_sync::refresh::hos::HosRefreshController;
use trucklog_sync::refresh::trips::TripsRefreshController;
use trucklog_sync::state::FileStateStore;
use trucklog_sync::transport::polling::PollingTransport;
use trucklog_sync::transport::websocket::WebSocketTransport;
use trucklog_sync::transport::{Transport, TransportEvent};

/// Externally supplied collaborators, separated from the container so tests
/// can substitute any of them.
pub struct SessionParts {
    /// Transport strategy.
    pub transport: Arc<dyn Transport>,
    /// Client-state persistence.
    pub state: Arc<dyn StateStore>,
    /// Backend notification surface.
    pub notification_api: Arc<dyn NotificationApi>,
    /// Backend HOS surface.
    pub hos_api: Arc<dyn HosApi>,
    /// Backend trip surface.
    pub trip_api: Arc<dyn TripApi>,
    /// Host delivery capabilities.
    pub sink: Arc<dyn AlertSink>,
}

/// Owns every sync-layer service for one authenticated session.
///
/// Created on login, disposed on logout; no service outlives the container,
/// and no timer survives `shutdown`.
pub struct SessionContainer {
    bus: EventBus,
    transport: Arc<dyn Transport>,
    monitor: Arc<ConnectionMonitor>,
    router: Arc<ChannelRouter>,
    notifications: Arc<NotificationStore>,
    hos: Arc<HosRefreshController>,
    trips: Arc<TripsRefreshController>,
    dispatch: Mutex<Option<JoinHandle<()>>>,
}

impl SessionContainer {
    /// Builds the container with the reqwest-backed API client and the
    /// transport strategy selected in configuration.
    pub async fn new(config: ClientConfig, sink: Arc<dyn AlertSink>) -> AppResult<Self> {
        let api = Arc::new(ApiClient::new(&config.backend)?);

        let transport: Arc<dyn Transport> = match config.sync.transport {
            TransportKind::Polling => Arc::new(PollingTransport::new(
                Arc::clone(&api) as Arc<dyn PollApi>,
                Duration::from_secs(config.sync.poll_interval_seconds),
                config.sync.event_buffer_size,
            )),
            TransportKind::Websocket => Arc::new(WebSocketTransport::new(
                config.sync.websocket_url.clone(),
                Duration::from_secs(config.sync.ping_interval_seconds),
                config.sync.event_buffer_size,
            )),
        };

        let parts = SessionParts {
            transport,
            state: Arc::new(FileStateStore::new(config.state.directory.clone())),
            notification_api: Arc::clone(&api) as Arc<dyn NotificationApi>,
            hos_api: Arc::clone(&api) as Arc<dyn HosApi>,
            trip_api: api as Arc<dyn TripApi>,
            sink,
        };

        Ok(Self::from_parts(config, parts).await)
    }

    /// Builds the container from explicit collaborators.
    pub async fn from_parts(config: ClientConfig, parts: SessionParts) -> Self {
        let bus = EventBus::new(config.sync.event_buffer_size);

        let monitor = Arc::new(ConnectionMonitor::new(
            Arc::clone(&parts.transport),
            bus.clone(),
            Duration::from_secs(config.sync.status_tick_seconds),
        ));

        let router = Arc::new(ChannelRouter::new(Arc::clone(&parts.transport)));

        let notifications = Arc::new(
            NotificationStore::load(
                parts.state,
                parts.notification_api,
                parts.sink,
                bus.clone(),
            )
            .await,
        );

        let hos = Arc::new(HosRefreshController::new(
            parts.hos_api,
            Arc::clone(&monitor),
            bus.clone(),
            config.refresh.clone(),
        ));

        let trips = Arc::new(TripsRefreshController::new(
            parts.trip_api,
            Arc::clone(&monitor),
            bus.clone(),
            config.refresh.clone(),
        ));

        Self {
            bus,
            transport: parts.transport,
            monitor,
            router,
            notifications,
            hos,
            trips,
            dispatch: Mutex::new(None),
        }
    }

    /// Connects the transport, subscribes the standing channels, and starts
    /// the monitor, dispatch task, and refresh controllers.
    pub async fn start(&self) {
        self.monitor.start();
        self.router.start();
        self.start_dispatch();

        self.transport.connect().await;

        self.router.subscribe(SyncChannel::Notifications).await;
        self.router.subscribe(SyncChannel::HosUpdates).await;
        self.router.subscribe(SyncChannel::TripUpdates).await;

        self.hos.start().await;
        self.trips.start().await;

        info!("Session started");
    }

    /// Tears the session down: stops every timer and task, disconnects the
    /// transport, and resets the connection status to disconnected defaults.
    pub async fn shutdown(&self) {
        self.hos.shutdown();
        self.trips.shutdown();
        self.router.shutdown();

        if let Some(task) = self.dispatch.lock().unwrap_or_else(|e| e.into_inner()).take() {
            task.abort();
        }

        self.transport.disconnect().await;
        self.monitor.shutdown();
        self.monitor.reset();

        info!("Session shut down");
    }

    /// Routes transport channel messages to their domain consumers.
    fn start_dispatch(&self) {
        let mut events = self.transport.events();
        let notifications = Arc::clone(&self.notifications);
        let hos = Arc::clone(&self.hos);
        let trips = Arc::clone(&self.trips);

        let handle = tokio::spawn(async move {
            loop {
                let message = match events.recv().await {
                    Ok(TransportEvent::Message(message)) => message,
                    Ok(_) => continue,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "Dispatch lagged behind transport events");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };

                match SyncChannel::parse(&message.channel) {
                    Some(SyncChannel::Notifications) => {
                        notifications.handle_channel_message(&message.payload).await;
                    }
                    Some(SyncChannel::HosUpdates) => hos.apply_push(&message.payload),
                    Some(SyncChannel::TripUpdates) | Some(SyncChannel::Trip(_)) => {
                        trips.apply_push(&message.payload);
                    }
                    None => {
                        debug!(channel = %message.channel, "Message on unknown channel");
                    }
                }
            }
        });

        *self.dispatch.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);
    }

    /// Hands a message to the transport, counting it when accepted.
    pub async fn send(&self, message: serde_json::Value) -> bool {
        let accepted = self.transport.send(message).await;
        if accepted {
            self.monitor.note_message_sent();
        }
        accepted
    }

    /// Subscribes to a trip entering scope.
    pub async fn watch_trip(&self, trip_id: i64) {
        self.router.watch_trip(trip_id).await;
    }

    /// Unsubscribes from a trip leaving scope (completed or cancelled).
    pub async fn unwatch_trip(&self, trip_id: i64) {
        self.router.unwatch_trip(trip_id).await;
    }

    /// Subscribe to session events.
    pub fn events(&self) -> broadcast::Receiver<SyncEvent> {
        self.bus.subscribe()
    }

    /// Current connection status snapshot.
    pub fn connection_status(&self) -> ConnectionStatus {
        self.monitor.snapshot()
    }

    /// Currently subscribed channel list, sorted for display.
    pub fn subscribed_channels(&self) -> Vec<String> {
        self.router.subscribed_channels()
    }

    /// The notification store.
    pub fn notifications(&self) -> &Arc<NotificationStore> {
        &self.notifications
    }

    /// The HOS refresh controller.
    pub fn hos(&self) -> &Arc<HosRefreshController> {
        &self.hos
    }

    /// The trip refresh controller.
    pub fn trips(&self) -> &Arc<TripsRefreshController> {
        &self.trips
    }
}
