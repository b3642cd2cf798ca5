//! Notification store, read ledger, and delivery policy.

pub mod delivery;
pub mod ledger;
pub mod store;

pub use delivery::{DeliveryPlan, NoopAlertSink, plan_delivery};
pub use ledger::ReadLedger;
pub use store::NotificationStore;
