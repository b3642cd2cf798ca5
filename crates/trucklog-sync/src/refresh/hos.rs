//! HOS status refresh controller.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, warn};

use trucklog_api::HosApi;
use trucklog_core::config::refresh::RefreshConfig;
use trucklog_core::result::AppResult;
use trucklog_entity::hos::HosStatus;

use crate::bus::{EventBus, SyncEvent};
use crate::connection::monitor::ConnectionMonitor;

use super::guard::RefreshGuard;

/// Keeps the HOS status cache fresh: push-fed while the transport is
/// connected, interval-polled while it is not, always rate-bounded by the
/// minimum-interval guard.
pub struct HosRefreshController {
    /// Backend HOS surface.
    api: Arc<dyn HosApi>,
    /// Connection status source.
    monitor: Arc<ConnectionMonitor>,
    /// Session bus.
    bus: EventBus,
    /// Refresh cadence configuration.
    config: RefreshConfig,
    /// Cached snapshot; `None` until the first load attempt completes.
    /// Shared with the interval task.
    cache: Arc<Mutex<Option<HosStatus>>>,
    /// Minimum-interval guard, shared with the interval task.
    guard: Arc<RefreshGuard>,
    /// Interval task.
    task: Mutex<Option<JoinHandle<()>>>,
}

impl HosRefreshController {
    /// Creates a controller.
    pub fn new(
        api: Arc<dyn HosApi>,
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

    /// One timer tick. Skipped entirely while the cache is fresh — a
    /// connected transport keeps it fresh through pushes, so the timer only
    /// acts as a safety net.
    pub async fn tick(&self) {
        Self::run_tick(&self.api, &self.monitor, &self.bus, &self.cache, &self.guard).await;
    }

    /// Manual refresh, bypassing the guard. Failure is surfaced to the
    /// caller for a toast; the cache keeps its last known good value.
    pub async fn refresh_now(&self) -> AppResult<HosStatus> {
        self.guard.arm();
        let status = self.api.fetch_hos_status().await?;
        Self::apply(&self.bus, &self.cache, status.clone());
        Ok(status)
    }

    /// Applies a pushed HOS update from the transport. Counts as a refresh
    /// for the guard, so interval fetches stay suppressed while pushes flow.
    pub fn apply_push(&self, payload: &serde_json::Value) {
        match serde_json::from_value::<HosStatus>(payload.clone()) {
            Ok(status) => {
                self.guard.arm();
                Self::apply(&self.bus, &self.cache, status);
            }
            Err(e) => warn!(error = %e, "Discarding malformed HOS update"),
        }
    }

    /// Current cached snapshot.
    pub fn status(&self) -> Option<HosStatus> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Whether any HOS limit is close to exhausted. Derived from the cache
    /// on every call, never cached itself.
    pub fn is_approaching_limit(&self) -> bool {
        self.status()
            .map(|s| s.is_approaching_limit())
            .unwrap_or(false)
    }

    async fn fetch(&self) {
        Self::run_fetch(&self.api, &self.bus, &self.cache, &self.guard).await;
    }

    async fn run_tick(
        api: &Arc<dyn HosApi>,
        monitor: &Arc<ConnectionMonitor>,
        bus: &EventBus,
        cache: &Arc<Mutex<Option<HosStatus>>>,
        guard: &Arc<RefreshGuard>,
    ) {
        if guard.is_fresh() {
            debug!("Skipping HOS refresh, cache is fresh");
            return;
        }
        if monitor.snapshot().is_connected
            && cache.lock().unwrap_or_else(|e| e.into_inner()).is_some()
        {
            // Connected with data but no recent push: fall through and
            // fetch as the safety net.
            debug!("HOS safety-net refresh while connected");
        }
        Self::run_fetch(api, bus, cache, guard).await;
    }

    /// Background fetch. Failure keeps cached data; only a first-ever
    /// failure substitutes the conservative fallback so the UI never
    /// regresses from known-good to empty.
    async fn run_fetch(
        api: &Arc<dyn HosApi>,
        bus: &EventBus,
        cache: &Arc<Mutex<Option<HosStatus>>>,
        guard: &Arc<RefreshGuard>,
    ) {
        guard.arm();
        match api.fetch_hos_status().await {
            Ok(status) => Self::apply(bus, cache, status),
            Err(e) => {
                let mut cache = cache.lock().unwrap_or_else(|e| e.into_inner());
                if cache.is_none() {
                    warn!(error = %e, "First HOS load failed, using conservative fallback");
                    let fallback = HosStatus::conservative(Utc::now());
                    *cache = Some(fallback.clone());
                    drop(cache);
                    bus.publish(SyncEvent::HosStatusChanged(fallback));
                } else {
                    debug!(error = %e, "HOS refresh failed, keeping cached status");
                }
            }
        }
    }

    fn apply(bus: &EventBus, cache: &Mutex<Option<HosStatus>>, status: HosStatus) {
        *cache.lock().unwrap_or_else(|e| e.into_inner()) = Some(status.clone());
        bus.publish(SyncEvent::HosStatusChanged(status));
    }
}
