//! Transport trait between the query executor and the network

use async_trait::async_trait;

use crate::Result;

/// Raw HTTP response from the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl GatewayResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Check if the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends JSON requests to the gateway.
///
/// Implementations must return `Err(GqlzError::Transport)` only when no HTTP
/// response was received; any response, whatever its status, is returned as
/// a [`GatewayResponse`].
#[async_trait]
pub trait GatewayTransport: Send + Sync {
    /// POST `body` to `url`, authenticating with `admin_secret`
    async fn post_json(
        &self,
        url: &str,
        admin_secret: &str,
        body: &serde_json::Value,
    ) -> Result<GatewayResponse>;
}

#[async_trait]
impl<T: GatewayTransport + ?Sized> GatewayTransport for std::sync::Arc<T> {
    async fn post_json(
        &self,
        url: &str,
        admin_secret: &str,
        body: &serde_json::Value,
    ) -> Result<GatewayResponse> {
        (**self).post_json(url, admin_secret, body).await
    }
}
