//! Notification type and priority enumerations.

use serde::{Deserialize, Serialize};

/// Classification of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// Informational message.
    Info,
    /// Successful operation.
    Success,
    /// Non-critical issue the driver should be aware of.
    Warning,
    /// An error or failure.
    Error,
    /// Hours-of-service violation alert.
    HosViolation,
    /// Trip status change.
    TripUpdate,
    /// Vehicle maintenance reminder.
    Maintenance,
    /// Document-related event.
    Document,
    /// System-level message.
    System,
}

impl NotificationType {
    /// Parse from string with an `info` fallback.
    pub fn from_str_value(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "success" => Self::Success,
            "warning" => Self::Warning,
            "error" => Self::Error,
            "hos_violation" => Self::HosViolation,
            "trip_update" => Self::TripUpdate,
            "maintenance" => Self::Maintenance,
            "document" => Self::Document,
            "system" => Self::System,
            _ => Self::Info,
        }
    }

    /// Convert to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::HosViolation => "hos_violation",
            Self::TripUpdate => "trip_update",
            Self::Maintenance => "maintenance",
            Self::Document => "document",
            Self::System => "system",
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Notification priority levels, ordered low to urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPriority {
    /// Low priority — background events.
    Low,
    /// Normal priority — standard events.
    Normal,
    /// High priority — important events.
    High,
    /// Urgent priority — requires immediate attention.
    Urgent,
}

impl NotificationPriority {
    /// Parse from string with a `normal` fallback.
    pub fn from_str_value(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "low" => Self::Low,
            "high" => Self::High,
            "urgent" => Self::Urgent,
            _ => Self::Normal,
        }
    }

    /// Convert to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    /// Map a backend integer level to a priority, clamping above `urgent`.
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => Self::Low,
            1 => Self::Normal,
            2 => Self::High,
            _ => Self::Urgent,
        }
    }

    /// The backend integer level for this priority.
    pub fn level(&self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Normal => 1,
            Self::High => 2,
            Self::Urgent => 3,
        }
    }

    /// Whether this priority triggers sound and vibration by default.
    pub fn alerts_by_default(&self) -> bool {
        matches!(self, Self::High | Self::Urgent)
    }

    /// Whether records of this priority persist past auto-dismiss by default.
    pub fn persistent_by_default(&self) -> bool {
        matches!(self, Self::Urgent)
    }
}

impl std::fmt::Display for NotificationPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
