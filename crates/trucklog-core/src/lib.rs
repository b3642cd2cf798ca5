//! # trucklog-core
//!
//! Core crate for the TruckLog client. Contains capability traits,
//! configuration schemas, and the unified error system.
//!
//! This crate has **no** internal dependencies on other TruckLog crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
