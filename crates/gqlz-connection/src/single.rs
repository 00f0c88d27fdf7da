//! Single-connection store
//!
//! One endpoint/secret pair with its health and query state. Clearing the
//! connection deletes the saved snapshot instead of writing an empty one.

use parking_lot::RwLock;
use std::sync::Arc;

use gqlz_core::{Fault, GatewayTransport, GraphQlVariables, QueryResult, SqlOptions, SqlPayload};

use crate::executor::QueryExecutor;
use crate::health::{ConnectionHealth, ConnectionState, ProbeReport};
use crate::storage::{KeyValueStore, PersistenceBridge};
use crate::{ConnectionTarget, StoreSettings};

pub struct SingleConnectionStore {
    connection: RwLock<ConnectionTarget>,
    health: ConnectionHealth,
    executor: QueryExecutor,
    persistence: PersistenceBridge,
}

impl SingleConnectionStore {
    /// Create an unconfigured store that persists nothing
    pub fn new(transport: Arc<dyn GatewayTransport>) -> Self {
        Self::with_bridge(transport, PersistenceBridge::disabled())
    }

    /// Create a store hydrated from `store` under `key`
    pub fn with_persistence(
        transport: Arc<dyn GatewayTransport>,
        store: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
    ) -> Self {
        Self::with_bridge(transport, PersistenceBridge::new(store, key))
    }

    /// Create a store persisting under the configured single-connection key
    pub fn with_settings(
        transport: Arc<dyn GatewayTransport>,
        store: Arc<dyn KeyValueStore>,
        settings: &StoreSettings,
    ) -> Self {
        Self::with_persistence(transport, store, settings.single_storage_key.clone())
    }

    fn with_bridge(transport: Arc<dyn GatewayTransport>, persistence: PersistenceBridge) -> Self {
        let connection: ConnectionTarget = persistence.load().unwrap_or_default();
        if !connection.is_empty() {
            tracing::info!(
                endpoint = %connection.endpoint_url,
                has_secret = !connection.admin_secret.is_empty(),
                "connection restored"
            );
        }

        Self {
            connection: RwLock::new(connection),
            health: ConnectionHealth::new(),
            executor: QueryExecutor::new(transport),
            persistence,
        }
    }

    pub fn endpoint_url(&self) -> String {
        self.connection.read().endpoint_url.clone()
    }

    pub fn admin_secret(&self) -> String {
        self.connection.read().admin_secret.clone()
    }

    /// Whether both an endpoint and a secret are set
    pub fn has_connection(&self) -> bool {
        self.connection.read().is_configured()
    }

    /// Current persisted shape
    pub fn snapshot(&self) -> ConnectionTarget {
        self.connection.read().clone()
    }

    pub fn state(&self) -> ConnectionState {
        self.health.state()
    }

    pub fn last_probe(&self) -> Option<ProbeReport> {
        self.health.last_probe()
    }

    pub fn is_loading(&self) -> bool {
        self.executor.is_loading()
    }

    pub fn last_error(&self) -> Option<Fault> {
        self.executor.last_error()
    }

    /// Replace the endpoint and secret.
    ///
    /// Unchanged values are a no-op. Any change resets the state to `Idle`.
    #[tracing::instrument(skip_all, fields(endpoint = %endpoint_url))]
    pub fn update_connection(&self, endpoint_url: &str, admin_secret: &str) {
        let next = ConnectionTarget::new(endpoint_url, admin_secret);
        {
            let mut connection = self.connection.write();
            if *connection == next {
                return;
            }
            *connection = next.clone();
        }

        if next.is_empty() {
            self.persistence.remove();
        } else {
            self.persistence.save(&next);
        }
        self.health.reset();
        tracing::info!(has_secret = !next.admin_secret.is_empty(), "connection updated");
    }

    /// Forget the endpoint and secret and delete the saved snapshot
    pub fn clear_connection(&self) {
        self.update_connection("", "");
    }

    /// Probe the connection with `SELECT 1`.
    ///
    /// Returns `false` without changing state when no connection is set.
    #[tracing::instrument(skip(self))]
    pub async fn test_connection(&self) -> bool {
        let target = self.active_target();
        self.health.test(&self.executor, target).await
    }

    pub async fn execute_graphql(
        &self,
        query: &str,
        variables: &GraphQlVariables,
    ) -> QueryResult<serde_json::Value> {
        let target = self.active_target();
        self.executor
            .execute_graphql(target.as_ref(), query, variables)
            .await
    }

    pub async fn execute_sql(&self, sql: &str, options: SqlOptions) -> QueryResult<SqlPayload> {
        let target = self.active_target();
        self.executor.execute_sql(target.as_ref(), sql, options).await
    }

    fn active_target(&self) -> Option<ConnectionTarget> {
        Some(self.snapshot()).filter(ConnectionTarget::is_configured)
    }
}
