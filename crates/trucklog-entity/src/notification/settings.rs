//! User notification delivery settings.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::types::NotificationPriority;

/// Quiet-hours delivery window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuietHours {
    /// Whether quiet hours are enforced.
    #[serde(default)]
    pub enabled: bool,
    /// Window start, local time.
    #[serde(default = "default_quiet_start")]
    pub start: NaiveTime,
    /// Window end, local time. May be earlier than `start` (overnight window).
    #[serde(default = "default_quiet_end")]
    pub end: NaiveTime,
}

impl QuietHours {
    /// Whether `now` falls inside the `[start, end)` window.
    ///
    /// An overnight window (start later than end, e.g. 22:00-07:00) wraps
    /// past midnight.
    pub fn contains(&self, now: NaiveTime) -> bool {
        if !self.enabled {
            return false;
        }
        if self.start < self.end {
            self.start <= now && now < self.end
        } else {
            now >= self.start || now < self.end
        }
    }
}

impl Default for QuietHours {
    fn default() -> Self {
        Self {
            enabled: false,
            start: default_quiet_start(),
            end: default_quiet_end(),
        }
    }
}

/// Persisted notification settings, loaded once at store construction and
/// written back on every mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// Whether the notification tone is enabled.
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    /// Whether vibration is enabled.
    #[serde(default = "default_true")]
    pub vibration_enabled: bool,
    /// Whether OS-level notifications are enabled.
    #[serde(default = "default_true")]
    pub browser_notifications_enabled: bool,
    /// Last known OS notification permission state.
    #[serde(default)]
    pub os_permission_granted: bool,
    /// Whether opening the notification panel marks items read.
    #[serde(default)]
    pub auto_mark_as_read: bool,
    /// Quiet-hours window.
    #[serde(default)]
    pub quiet_hours: QuietHours,
    /// Minimum priority shown in filtered views. Storage is never filtered.
    #[serde(default = "default_priority_filter")]
    pub priority_filter: NotificationPriority,
    /// Maximum number of stored notifications before oldest-first eviction.
    #[serde(default = "default_max_stored")]
    pub max_stored: usize,
    /// Whether interval-driven auto refresh is enabled.
    #[serde(default = "default_true")]
    pub auto_refresh: bool,
    /// Auto-refresh interval in seconds.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_seconds: u64,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            vibration_enabled: true,
            browser_notifications_enabled: true,
            os_permission_granted: false,
            auto_mark_as_read: false,
            quiet_hours: QuietHours::default(),
            priority_filter: default_priority_filter(),
            max_stored: default_max_stored(),
            auto_refresh: true,
            refresh_interval_seconds: default_refresh_interval(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_priority_filter() -> NotificationPriority {
    NotificationPriority::Low
}

fn default_max_stored() -> usize {
    100
}

fn default_refresh_interval() -> u64 {
    60
}

fn default_quiet_start() -> NaiveTime {
    NaiveTime::from_hms_opt(22, 0, 0).unwrap_or(NaiveTime::MIN)
}

fn default_quiet_end() -> NaiveTime {
    NaiveTime::from_hms_opt(7, 0, 0).unwrap_or(NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(start: (u32, u32), end: (u32, u32)) -> QuietHours {
        QuietHours {
            enabled: true,
            start: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
        }
    }

    #[test]
    fn test_overnight_window_wraps() {
        let q = window((22, 0), (7, 0));
        assert!(q.contains(NaiveTime::from_hms_opt(23, 30, 0).unwrap()));
        assert!(q.contains(NaiveTime::from_hms_opt(3, 0, 0).unwrap()));
        assert!(!q.contains(NaiveTime::from_hms_opt(12, 0, 0).unwrap()));
    }

    #[test]
    fn test_window_end_is_exclusive() {
        let q = window((9, 0), (17, 0));
        assert!(q.contains(NaiveTime::from_hms_opt(9, 0, 0).unwrap()));
        assert!(!q.contains(NaiveTime::from_hms_opt(17, 0, 0).unwrap()));
    }

    #[test]
    fn test_disabled_window_never_matches() {
        let mut q = window((0, 0), (23, 59));
        q.enabled = false;
        assert!(!q.contains(NaiveTime::from_hms_opt(12, 0, 0).unwrap()));
    }
}
