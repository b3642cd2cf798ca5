//! Trip summary entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    /// Planned but not started.
    Planned,
    /// Currently underway.
    InProgress,
    /// Finished.
    Completed,
    /// Cancelled before completion.
    Cancelled,
}

impl TripStatus {
    /// Whether the trip is still in scope for live updates.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Planned | Self::InProgress)
    }

    /// Convert to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Summary of a trip as listed by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripSummary {
    /// Server row id.
    pub id: i64,
    /// Display name.
    pub trip_name: String,
    /// Pickup location name.
    pub pickup_location: String,
    /// Delivery location name.
    pub delivery_location: String,
    /// Planned departure.
    pub planned_start_time: DateTime<Utc>,
    /// Planned arrival.
    pub planned_end_time: DateTime<Utc>,
    /// Lifecycle status.
    pub status: TripStatus,
    /// Cycle hours available when the trip was planned.
    #[serde(default)]
    pub hours_available: Option<f64>,
    /// When the summary was last modified server-side.
    pub updated_at: DateTime<Utc>,
}

impl TripSummary {
    /// Whether the trip is past its planned end and still active.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status.is_active() && self.planned_end_time < now
    }
}

/// Whether any trip in the list is overdue. Derived on demand, never cached.
pub fn has_overdue_trips(trips: &[TripSummary], now: DateTime<Utc>) -> bool {
    trips.iter().any(|t| t.is_overdue(now))
}
