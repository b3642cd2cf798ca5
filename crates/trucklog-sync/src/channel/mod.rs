//! Channel naming and domain subscription routing.

pub mod router;
pub mod types;

pub use router::ChannelRouter;
pub use types::SyncChannel;
