//! Reqwest-backed backend API client.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use trucklog_core::config::backend::BackendConfig;
use trucklog_core::error::AppError;
use trucklog_core::result::AppResult;

/// HTTP client for the TruckLog backend API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// Underlying reqwest client with the configured timeout.
    http: reqwest::Client,
    /// Base URL without a trailing slash.
    base_url: String,
    /// Bearer token, if configured.
    auth_token: Option<String>,
}

impl ApiClient {
    /// Create a new API client from configuration.
    pub fn new(config: &BackendConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| AppError::backend(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check_status(response: reqwest::Response) -> AppResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let path = response.url().path().to_string();
            Err(AppError::backend(format!(
                "Request to {path} failed with status {status}"
            )))
        }
    }

    /// GET a JSON payload.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        debug!(path, "GET");
        let response = self
            .authorize(self.http.get(self.url(path)))
            .send()
            .await
            .map_err(|e| AppError::backend(format!("GET {path} failed: {e}")))?;

        Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::serialization(format!("GET {path} returned invalid JSON: {e}")))
    }

    /// POST a JSON body and discard the response payload.
    pub async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> AppResult<()> {
        debug!(path, "POST");
        let response = self
            .authorize(self.http.post(self.url(path)))
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::backend(format!("POST {path} failed: {e}")))?;

        Self::check_status(response).await.map(|_| ())
    }

    /// POST with an empty body and discard the response payload.
    pub async fn post_empty(&self, path: &str) -> AppResult<()> {
        debug!(path, "POST");
        let response = self
            .authorize(self.http.post(self.url(path)))
            .send()
            .await
            .map_err(|e| AppError::backend(format!("POST {path} failed: {e}")))?;

        Self::check_status(response).await.map(|_| ())
    }
}
