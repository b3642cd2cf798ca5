//! HOS compliance summary endpoint.

use async_trait::async_trait;

use trucklog_core::result::AppResult;
use trucklog_entity::hos::HosStatus;

use crate::client::ApiClient;

/// Backend HOS status operations.
#[async_trait]
pub trait HosApi: Send + Sync {
    /// Fetch the server-computed compliance summary for the current driver.
    async fn fetch_hos_status(&self) -> AppResult<HosStatus>;
}

#[async_trait]
impl HosApi for ApiClient {
    async fn fetch_hos_status(&self) -> AppResult<HosStatus> {
        self.get_json("hos/compliance/summary/").await
    }
}
