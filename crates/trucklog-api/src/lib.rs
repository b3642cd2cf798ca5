//! # trucklog-api
//!
//! HTTP client for the TruckLog backend. Exposes the backend surface as
//! async traits (`NotificationApi`, `HosApi`, `TripApi`, `PollApi`) so the
//! sync layer depends on the contract and tests substitute mocks; `ApiClient`
//! is the reqwest-backed implementation of all of them.

pub mod client;
pub mod hos;
pub mod notifications;
pub mod poll;
pub mod trips;

pub use client::ApiClient;
pub use hos::HosApi;
pub use notifications::{BackendNotification, CreateNotification, NotificationApi, NotificationData};
pub use poll::{PollApi, PolledEvent};
pub use trips::TripApi;
