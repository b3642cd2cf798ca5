//! Trip list refresh controller.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, warn};

use trucklog_api::TripApi;
use trucklog_core::config::refresh::RefreshConfig;
use trucklog_core::result::AppResult;
use trucklog_entity::trip::{self, TripSummary};

use crate::bus::{EventBus, SyncEvent};
use crate::connection::monitor::ConnectionMonitor;

use super::guard::RefreshGuard;

/// Keeps the trip list cache fresh with the same push-first, guard-bounded
/// policy as the HOS controller.
pub struct TripsRefreshController {
    /// Backend trip surface.
    api: Arc<dyn TripApi>,
    /// Connection status source.
    monitor: Arc<ConnectionMonitor>,
    /// Session bus.
    bus: EventBus,
    /// Refresh cadence configuration.
    config: RefreshConfig,
    /// Cached trip list; `None` until the first load attempt completes.
    /// Shared with the interval task.
    cache: Arc<Mutex<Option<Vec<TripSummary>>>>,
    /// Minimum-interval guard, shared with the interval task.
    guard: Arc<RefreshGuard>,
    /// Interval task.
    task: Mutex<Option<JoinHandle<()>>>,
}

impl TripsRefreshController {
    /// Creates a controller.
    pub fn new(
        api: Arc<dyn TripApi>,
        monitor: Arc<ConnectionMonitor>,
        bus: EventBus,
        config: RefreshConfig,
    ) -> Self {
        let guard = Arc::new(RefreshGuard::new(Duration::from_secs(
            config.min_fetch_interval_seconds,
        )));
        Self {
            api,
            monitor,
            bus,
            config,
            cache: Arc::new(Mutex::new(None)),
            guard,
            task: Mutex::new(None),
        }
    }

    /// Fetches immediately, then starts the interval loop when auto refresh
    /// is enabled.
    pub async fn start(&self) {
        self.fetch().await;

        if !self.config.auto_refresh {
            return;
        }

        let api = Arc::clone(&self.api);
        let monitor = Arc::clone(&self.monitor);
        let bus = self.bus.clone();
        let cache = Arc::clone(&self.cache);
        let guard = Arc::clone(&self.guard);
        let interval_duration = Duration::from_secs(self.config.interval_seconds);
        let handle = tokio::spawn(async move {
            let mut interval = time::interval(interval_duration);
            interval.tick().await;
            loop {
                interval.tick().await;
                Self::run_tick(&api, &monitor, &bus, &cache, &guard).await;
            }
        });
        *self.task.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);
    }

    /// Stops the interval loop.
    pub fn shutdown(&self) {
        if let Some(handle) = self.task.lock().unwrap_or_else(|e| e.into_inner()).take() {
            handle.abort();
        }
    }

    /// One timer tick; skipped while the cache is fresh.
    pub async fn tick(&self) {
        Self::run_tick(&self.api, &self.monitor, &self.bus, &self.cache, &self.guard).await;
    }

    /// Manual refresh, bypassing the guard.
    pub async fn refresh_now(&self) -> AppResult<Vec<TripSummary>> {
        self.guard.arm();
        let trips = self.api.fetch_trips().await?;
        Self::apply(&self.bus, &self.cache, trips.clone());
        Ok(trips)
    }

    /// Applies a pushed single-trip update: upsert by id, counting as a
    /// refresh for the guard.
    pub fn apply_push(&self, payload: &serde_json::Value) {
        match serde_json::from_value::<TripSummary>(payload.clone()) {
            Ok(updated) => {
                self.guard.arm();
                let trip_id = updated.id;
                let snapshot = {
                    let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
                    let trips = cache.get_or_insert_with(Vec::new);
                    match trips.iter_mut().find(|t| t.id == updated.id) {
                        Some(existing) => *existing = updated,
                        None => trips.push(updated),
                    }
                    trips.clone()
                };
                self.bus.publish(SyncEvent::TripUpdated { trip_id });
                self.bus.publish(SyncEvent::TripsChanged(snapshot));
            }
            Err(e) => warn!(error = %e, "Discarding malformed trip update"),
        }
    }

    /// Current cached trip list; empty until data arrives.
    pub fn trips(&self) -> Vec<TripSummary> {
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .unwrap_or_default()
    }

    /// Whether any active trip is past its planned end. Derived from the
    /// cache on every call, never cached itself.
    pub fn has_overdue_trips(&self) -> bool {
        trip::has_overdue_trips(&self.trips(), Utc::now())
    }

    /// Whether a load attempt has completed; distinguishes an empty list
    /// from a list that has not loaded yet.
    pub fn has_loaded(&self) -> bool {
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    async fn fetch(&self) {
        Self::run_fetch(&self.api, &self.bus, &self.cache, &self.guard).await;
    }

    async fn run_tick(
        api: &Arc<dyn TripApi>,
        monitor: &Arc<ConnectionMonitor>,
        bus: &EventBus,
        cache: &Arc<Mutex<Option<Vec<TripSummary>>>>,
        guard: &Arc<RefreshGuard>,
    ) {
        if guard.is_fresh() {
            debug!("Skipping trip refresh, cache is fresh");
            return;
        }
        if monitor.snapshot().is_connected
            && cache.lock().unwrap_or_else(|e| e.into_inner()).is_some()
        {
            debug!("Trip safety-net refresh while connected");
        }
        Self::run_fetch(api, bus, cache, guard).await;
    }

    /// Background fetch. Failure keeps cached data; only a first-ever
    /// failure substitutes the empty fallback list.
    async fn run_fetch(
        api: &Arc<dyn TripApi>,
        bus: &EventBus,
        cache: &Arc<Mutex<Option<Vec<TripSummary>>>>,
        guard: &Arc<RefreshGuard>,
    ) {
        guard.arm();
        match api.fetch_trips().await {
            Ok(trips) => Self::apply(bus, cache, trips),
            Err(e) => {
                let mut cache = cache.lock().unwrap_or_else(|e| e.into_inner());
                if cache.is_none() {
                    warn!(error = %e, "First trip load failed, starting with an empty list");
                    *cache = Some(Vec::new());
                    drop(cache);
                    bus.publish(SyncEvent::TripsChanged(Vec::new()));
                } else {
                    debug!(error = %e, "Trip refresh failed, keeping cached list");
                }
            }
        }
    }

    fn apply(bus: &EventBus, cache: &Mutex<Option<Vec<TripSummary>>>, trips: Vec<TripSummary>) {
        *cache.lock().unwrap_or_else(|e| e.into_inner()) = Some(trips.clone());
        bus.publish(SyncEvent::TripsChanged(trips));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;

    use trucklog_core::AppError;
    use trucklog_entity::trip::TripStatus;

    use crate::transport::{ConnectionState, Transport, TransportEvent};

    struct MockTripApi {
        fail: AtomicBool,
        fetches: AtomicUsize,
    }

    impl MockTripApi {
        fn new() -> Self {
            Self {
                fail: AtomicBool::new(false),
                fetches: AtomicUsize::new(0),
            }
        }
    }

    fn trip(id: i64, status: TripStatus, ends_in_hours: i64) -> TripSummary {
        let now = Utc::now();
        TripSummary {
            id,
            trip_name: format!("trip-{id}"),
            pickup_location: "Fresno, CA".to_string(),
            delivery_location: "Portland, OR".to_string(),
            planned_start_time: now - ChronoDuration::hours(2),
            planned_end_time: now + ChronoDuration::hours(ends_in_hours),
            status,
            hours_available: None,
            updated_at: now,
        }
    }

    #[async_trait]
    impl TripApi for MockTripApi {
        async fn fetch_trips(&self) -> AppResult<Vec<TripSummary>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(AppError::backend("trips unavailable"));
            }
            Ok(vec![trip(1, TripStatus::InProgress, 3)])
        }
    }

    struct IdleTransport {
        events: tokio::sync::broadcast::Sender<TransportEvent>,
    }

    impl IdleTransport {
        fn new() -> Self {
            let (events, _) = tokio::sync::broadcast::channel(8);
            Self { events }
        }
    }

    #[async_trait]
    impl Transport for IdleTransport {
        async fn connect(&self) {}
        async fn disconnect(&self) {}
        async fn send(&self, _message: serde_json::Value) -> bool {
            false
        }
        async fn subscribe(&self, _channel: &str) {}
        async fn unsubscribe(&self, _channel: &str) {}
        fn state(&self) -> ConnectionState {
            ConnectionState::Disconnected
        }
        fn events(&self) -> tokio::sync::broadcast::Receiver<TransportEvent> {
            self.events.subscribe()
        }
    }

    fn controller(api: Arc<MockTripApi>, min_fetch_interval_seconds: u64) -> Arc<TripsRefreshController> {
        let bus = EventBus::new(64);
        let monitor = Arc::new(ConnectionMonitor::new(
            Arc::new(IdleTransport::new()) as Arc<dyn Transport>,
            bus.clone(),
            Duration::from_secs(5),
        ));
        Arc::new(TripsRefreshController::new(
            api,
            monitor,
            bus,
            RefreshConfig {
                auto_refresh: false,
                interval_seconds: 60,
                min_fetch_interval_seconds,
            },
        ))
    }

    #[tokio::test]
    async fn test_start_loads_trips() {
        let api = Arc::new(MockTripApi::new());
        let c = controller(Arc::clone(&api), 30);
        c.start().await;
        assert_eq!(c.trips().len(), 1);
    }

    #[tokio::test]
    async fn test_guard_blocks_rapid_ticks() {
        let api = Arc::new(MockTripApi::new());
        let c = controller(Arc::clone(&api), 30);
        c.start().await;
        c.tick().await;
        c.tick().await;
        assert_eq!(api.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_first_load_failure_yields_empty_list() {
        let api = Arc::new(MockTripApi::new());
        api.fail.store(true, Ordering::SeqCst);
        let c = controller(Arc::clone(&api), 0);
        c.start().await;
        assert!(c.trips().is_empty());
        assert!(c.has_loaded());
    }

    #[tokio::test]
    async fn test_later_failure_keeps_cached_list() {
        let api = Arc::new(MockTripApi::new());
        let c = controller(Arc::clone(&api), 0);
        c.start().await;
        assert_eq!(c.trips().len(), 1);

        api.fail.store(true, Ordering::SeqCst);
        c.tick().await;
        assert_eq!(c.trips().len(), 1);
    }

    #[tokio::test]
    async fn test_push_upserts_by_id() {
        let api = Arc::new(MockTripApi::new());
        let c = controller(Arc::clone(&api), 0);
        c.start().await;

        let mut updated = trip(1, TripStatus::Completed, 3);
        updated.trip_name = "renamed".to_string();
        c.apply_push(&serde_json::to_value(&updated).unwrap());

        let trips = c.trips();
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].trip_name, "renamed");
        assert_eq!(trips[0].status, TripStatus::Completed);

        // A push for an unseen trip appends.
        c.apply_push(&serde_json::to_value(trip(2, TripStatus::Planned, 5)).unwrap());
        assert_eq!(c.trips().len(), 2);
    }

    #[tokio::test]
    async fn test_overdue_is_derived() {
        let api = Arc::new(MockTripApi::new());
        let c = controller(Arc::clone(&api), 0);
        c.start().await;
        assert!(!c.has_overdue_trips());

        c.apply_push(&serde_json::to_value(trip(9, TripStatus::InProgress, -2)).unwrap());
        assert!(c.has_overdue_trips());
    }
}
