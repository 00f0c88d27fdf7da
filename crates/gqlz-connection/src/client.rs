//! HTTP transport backed by `reqwest`

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use gqlz_core::request::ADMIN_SECRET_HEADER;
use gqlz_core::{GatewayResponse, GatewayTransport, GqlzError, Result};

use crate::StoreSettings;

/// Gateway transport over HTTP(S)
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GqlzError::Transport(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn from_settings(settings: &StoreSettings) -> Result<Self> {
        Self::new(settings.request_timeout())
    }
}

#[async_trait]
impl GatewayTransport for HttpTransport {
    async fn post_json(
        &self,
        url: &str,
        admin_secret: &str,
        body: &serde_json::Value,
    ) -> Result<GatewayResponse> {
        tracing::trace!(url = %url, "sending gateway request");
        let response = self
            .client
            .post(url)
            .header(ADMIN_SECRET_HEADER, admin_secret)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::debug!(url = %url, error = %e, "gateway request failed");
                GqlzError::Transport(e.to_string())
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| GqlzError::Transport(format!("Failed to read response body: {}", e)))?;

        tracing::trace!(url = %url, status, bytes = body.len(), "gateway responded");
        Ok(GatewayResponse { status, body })
    }
}
