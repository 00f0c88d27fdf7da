//! Saved gateway connection records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Endpoint and credential a query is sent with.
///
/// This is also the persisted shape of the single-connection store.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionTarget {
    /// Base URL of the gateway, without the API path
    pub endpoint_url: String,
    /// Admin secret sent in the `x-hasura-admin-secret` header
    pub admin_secret: String,
}

impl ConnectionTarget {
    pub fn new(endpoint_url: impl Into<String>, admin_secret: impl Into<String>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            admin_secret: admin_secret.into(),
        }
    }

    /// Both endpoint and secret are set
    pub fn is_configured(&self) -> bool {
        !self.endpoint_url.is_empty() && !self.admin_secret.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoint_url.is_empty() && self.admin_secret.is_empty()
    }
}

impl std::fmt::Debug for ConnectionTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionTarget")
            .field("endpoint_url", &self.endpoint_url)
            .field("has_secret", &!self.admin_secret.is_empty())
            .finish()
    }
}

/// A named gateway connection in the multi-profile store
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    /// Unique identifier, fixed at creation
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Base URL of the gateway
    pub endpoint_url: String,

    /// Admin secret for the gateway
    pub admin_secret: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modified timestamp
    pub modified_at: DateTime<Utc>,
}

impl ConnectionRecord {
    /// Create a new record with a fresh identifier
    pub fn new(
        name: impl Into<String>,
        endpoint_url: impl Into<String>,
        admin_secret: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            endpoint_url: endpoint_url.into(),
            admin_secret: admin_secret.into(),
            created_at: now,
            modified_at: now,
        }
    }

    /// Replace the mutable fields, keeping the identifier
    pub fn update(&mut self, name: &str, endpoint_url: &str, admin_secret: &str) {
        self.name = name.to_string();
        self.endpoint_url = endpoint_url.to_string();
        self.admin_secret = admin_secret.to_string();
        self.modified_at = Utc::now();
    }

    pub fn target(&self) -> ConnectionTarget {
        ConnectionTarget::new(self.endpoint_url.clone(), self.admin_secret.clone())
    }
}

impl std::fmt::Debug for ConnectionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRecord")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("endpoint_url", &self.endpoint_url)
            .field("has_secret", &!self.admin_secret.is_empty())
            .field("created_at", &self.created_at)
            .field("modified_at", &self.modified_at)
            .finish()
    }
}
