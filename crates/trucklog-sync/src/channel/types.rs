//! Typed channel identifiers and parsing.

use serde::{Deserialize, Serialize};

/// Typed channel identifiers.
///
/// The name derivation is deterministic so that unsubscribe always matches
/// the name subscribe produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id")]
pub enum SyncChannel {
    /// Per-user notification stream.
    Notifications,
    /// HOS status changes for the current driver.
    HosUpdates,
    /// Trip list changes for the current driver.
    TripUpdates,
    /// Updates for a single trip.
    Trip(i64),
}

impl SyncChannel {
    /// The wire channel name.
    pub fn name(&self) -> String {
        match self {
            SyncChannel::Notifications => "notifications".to_string(),
            SyncChannel::HosUpdates => "hos_updates".to_string(),
            SyncChannel::TripUpdates => "trip_updates".to_string(),
            SyncChannel::Trip(id) => format!("trip_{id}"),
        }
    }

    /// Parses a channel name back into a typed channel.
    pub fn parse(channel: &str) -> Option<Self> {
        match channel {
            "notifications" => Some(SyncChannel::Notifications),
            "hos_updates" => Some(SyncChannel::HosUpdates),
            "trip_updates" => Some(SyncChannel::TripUpdates),
            other => other
                .strip_prefix("trip_")
                .and_then(|id| id.parse().ok())
                .map(SyncChannel::Trip),
        }
    }
}
