//! Hours-of-service status snapshot.
//!
//! The compliance math lives server-side; the client consumes the computed
//! snapshot and derives display values from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Remaining drive hours below which the driver is approaching a limit.
const APPROACH_DRIVE_HOURS: f64 = 1.0;
/// Remaining on-duty hours below which the driver is approaching a limit.
const APPROACH_DUTY_HOURS: f64 = 1.0;
/// Remaining cycle hours below which the driver is approaching a limit.
const APPROACH_CYCLE_HOURS: f64 = 2.0;

/// Current duty status of the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DutyStatus {
    /// Off duty.
    OffDuty,
    /// Resting in the sleeper berth.
    SleeperBerth,
    /// Driving.
    Driving,
    /// On duty, not driving.
    OnDutyNotDriving,
}

impl DutyStatus {
    /// Convert to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OffDuty => "off_duty",
            Self::SleeperBerth => "sleeper_berth",
            Self::Driving => "driving",
            Self::OnDutyNotDriving => "on_duty_not_driving",
        }
    }
}

/// Server-computed HOS compliance snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HosStatus {
    /// Current duty status.
    pub duty_status: DutyStatus,
    /// Whether the driver may legally drive right now.
    pub can_drive: bool,
    /// Whether the driver may legally be on duty right now.
    pub can_be_on_duty: bool,
    /// Whether a rest period is required before further driving.
    pub needs_rest: bool,
    /// Hours of driving remaining under the 11-hour limit.
    pub drive_hours_remaining: f64,
    /// Hours of on-duty time remaining under the 14-hour limit.
    pub duty_hours_remaining: f64,
    /// Hours remaining in the 60/70-hour cycle.
    pub cycle_hours_remaining: f64,
    /// Count of active violations.
    pub violations_count: u32,
    /// Compliance score, 0-100.
    pub compliance_score: f64,
    /// When the snapshot was computed.
    pub updated_at: DateTime<Utc>,
}

impl HosStatus {
    /// Conservative fallback used when no snapshot has ever loaded:
    /// assumes no hours remain and rest is required, so the UI never
    /// suggests available drive time it cannot verify.
    pub fn conservative(now: DateTime<Utc>) -> Self {
        Self {
            duty_status: DutyStatus::OffDuty,
            can_drive: false,
            can_be_on_duty: false,
            needs_rest: true,
            drive_hours_remaining: 0.0,
            duty_hours_remaining: 0.0,
            cycle_hours_remaining: 0.0,
            violations_count: 0,
            compliance_score: 0.0,
            updated_at: now,
        }
    }

    /// Whether any limit is close to exhausted. Derived on demand,
    /// never cached.
    pub fn is_approaching_limit(&self) -> bool {
        self.drive_hours_remaining < APPROACH_DRIVE_HOURS
            || self.duty_hours_remaining < APPROACH_DUTY_HOURS
            || self.cycle_hours_remaining < APPROACH_CYCLE_HOURS
    }

    /// Whether the snapshot carries any active violation.
    pub fn has_violations(&self) -> bool {
        self.violations_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(drive: f64, duty: f64, cycle: f64) -> HosStatus {
        HosStatus {
            duty_status: DutyStatus::Driving,
            can_drive: true,
            can_be_on_duty: true,
            needs_rest: false,
            drive_hours_remaining: drive,
            duty_hours_remaining: duty,
            cycle_hours_remaining: cycle,
            violations_count: 0,
            compliance_score: 100.0,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_approaching_limit() {
        assert!(!snapshot(5.0, 6.0, 20.0).is_approaching_limit());
        assert!(snapshot(0.5, 6.0, 20.0).is_approaching_limit());
        assert!(snapshot(5.0, 6.0, 1.5).is_approaching_limit());
    }

    #[test]
    fn test_conservative_fallback() {
        let s = HosStatus::conservative(Utc::now());
        assert!(!s.can_drive);
        assert!(s.needs_rest);
        assert!(s.is_approaching_limit());
    }
}
