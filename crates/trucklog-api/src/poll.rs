//! Event polling endpoint used by the polling transport.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use trucklog_core::result::AppResult;

use crate::client::ApiClient;

/// One event returned by the poll endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolledEvent {
    /// Channel the event was published on.
    pub channel: String,
    /// Event payload.
    pub payload: serde_json::Value,
}

/// Backend event-poll operations backing the polling transport.
#[async_trait]
pub trait PollApi: Send + Sync {
    /// Fetch pending events for the given channels.
    ///
    /// An empty channel list is a pure connectivity probe.
    async fn poll_events(&self, channels: &[String]) -> AppResult<Vec<PolledEvent>>;

    /// Publish a client-originated event.
    async fn publish_event(&self, message: &serde_json::Value) -> AppResult<()>;
}

#[async_trait]
impl PollApi for ApiClient {
    async fn poll_events(&self, channels: &[String]) -> AppResult<Vec<PolledEvent>> {
        let path = format!("events/poll/?channels={}", channels.join(","));
        self.get_json(&path).await
    }

    async fn publish_event(&self, message: &serde_json::Value) -> AppResult<()> {
        self.post_json("events/publish/", message).await
    }
}
