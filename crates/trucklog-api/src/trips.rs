//! Trip list endpoint.

use async_trait::async_trait;

use trucklog_core::result::AppResult;
use trucklog_entity::trip::TripSummary;

use crate::client::ApiClient;

/// Backend trip operations.
#[async_trait]
pub trait TripApi: Send + Sync {
    /// Fetch the trip list for the current driver.
    async fn fetch_trips(&self) -> AppResult<Vec<TripSummary>>;
}

#[async_trait]
impl TripApi for ApiClient {
    async fn fetch_trips(&self) -> AppResult<Vec<TripSummary>> {
        self.get_json("trips/").await
    }
}
