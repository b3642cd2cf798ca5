//! Rate-limited domain refresh controllers.

pub mod guard;
pub mod hos;
pub mod trips;

pub use guard::RefreshGuard;
pub use hos::HosRefreshController;
pub use trips::TripsRefreshController;
