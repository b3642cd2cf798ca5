//! # trucklog-entity
//!
//! Domain entity models for the TruckLog client: notifications and their
//! settings, HOS status snapshots, and trip summaries.

pub mod hos;
pub mod notification;
pub mod trip;

pub use hos::{DutyStatus, HosStatus};
pub use notification::{
    Notification, NotificationDraft, NotificationPriority, NotificationSettings, NotificationType,
};
pub use trip::{TripStatus, TripSummary};
