//! Home Assistant REST client.

use std::time::Duration;

use serde_json::Value;

use crate::error::HubError;

/// Request timeout for every service call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for a local Home Assistant instance.
#[derive(Clone)]
pub struct HubClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HubClient {
    /// Create a client for the given base URL and long-lived token.
    pub fn new(base_url: &str, token: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    /// Call a Home Assistant service, e.g. `light.turn_on`.
    ///
    /// One POST against the services endpoint; non-2xx responses become
    /// errors for the dispatcher to log and report.
    pub async fn call_service(
        &self,
        domain: &str,
        service: &str,
        data: &Value,
    ) -> Result<(), HubError> {
        let url = format!("{}/api/services/{}/{}", self.base_url, domain, service);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(data)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(HubError::Status { status, body });
        }

        tracing::info!(domain, service, data = %data, "Called Home Assistant service");
        Ok(())
    }
}
