//! Minimum-interval guard bounding backend call rate.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Tracks the last refresh and rejects ticks inside the minimum window.
///
/// The window is measured from the last actual refresh (fetch or applied
/// push), not from timer start, so the call rate stays bounded however the
/// timer fires — including connect/disconnect flapping.
#[derive(Debug)]
pub struct RefreshGuard {
    /// Minimum time between refreshes.
    min_interval: Duration,
    /// When the cache was last refreshed.
    last_refresh: Mutex<Option<Instant>>,
}

impl RefreshGuard {
    /// Creates a guard with the given minimum interval.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_refresh: Mutex::new(None),
        }
    }

    /// Whether the cache was refreshed within the minimum window.
    pub fn is_fresh(&self) -> bool {
        self.last_refresh
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .map(|at| at.elapsed() < self.min_interval)
            .unwrap_or(false)
    }

    /// Records a refresh at the current instant.
    pub fn arm(&self) {
        *self.last_refresh.lock().unwrap_or_else(|e| e.into_inner()) = Some(Instant::now());
    }

    /// Forgets the last refresh, so the next tick fetches immediately.
    pub fn clear(&self) {
        *self.last_refresh.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}
