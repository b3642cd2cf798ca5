//! Capability and persistence traits implemented by other crates.

pub mod alerts;
pub mod state;

pub use alerts::{AlertSink, Toast};
pub use state::StateStore;
