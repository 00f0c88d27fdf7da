//! Multi-profile connection store
//!
//! Holds an ordered list of named gateway connections, one optional
//! selection, the health of the selected connection and the state of the
//! last query. Every mutation is written through to the persistence bridge.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use gqlz_core::{Fault, GatewayTransport, GraphQlVariables, QueryResult, SqlOptions, SqlPayload};

use crate::executor::QueryExecutor;
use crate::health::{ConnectionHealth, ConnectionState, ProbeReport};
use crate::storage::{KeyValueStore, PersistenceBridge};
use crate::{ConnectionRecord, ConnectionTarget, StoreSettings};

/// Persisted shape of the multi-profile store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilesSnapshot {
    pub records: Vec<ConnectionRecord>,
    pub selected_id: Option<Uuid>,
}

impl ProfilesSnapshot {
    fn contains(&self, id: Uuid) -> bool {
        self.records.iter().any(|r| r.id == id)
    }

    fn selected(&self) -> Option<&ConnectionRecord> {
        let id = self.selected_id?;
        self.records.iter().find(|r| r.id == id)
    }
}

/// Manages named gateway connections and runs queries against the selected one
pub struct ConnectionManager {
    profiles: RwLock<ProfilesSnapshot>,
    health: ConnectionHealth,
    executor: QueryExecutor,
    persistence: PersistenceBridge,
}

impl ConnectionManager {
    /// Create an empty manager that persists nothing
    pub fn new(transport: Arc<dyn GatewayTransport>) -> Self {
        Self::with_bridge(transport, PersistenceBridge::disabled())
    }

    /// Create a manager hydrated from `store` under `key`.
    ///
    /// A missing or unreadable snapshot leaves the manager empty.
    pub fn with_persistence(
        transport: Arc<dyn GatewayTransport>,
        store: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
    ) -> Self {
        Self::with_bridge(transport, PersistenceBridge::new(store, key))
    }

    /// Create a manager persisting under the configured storage key
    pub fn with_settings(
        transport: Arc<dyn GatewayTransport>,
        store: Arc<dyn KeyValueStore>,
        settings: &StoreSettings,
    ) -> Self {
        Self::with_persistence(transport, store, settings.storage_key.clone())
    }

    fn with_bridge(transport: Arc<dyn GatewayTransport>, persistence: PersistenceBridge) -> Self {
        let mut profiles: ProfilesSnapshot = persistence.load().unwrap_or_default();
        if let Some(id) = profiles.selected_id
            && !profiles.contains(id)
        {
            tracing::warn!(selected_id = %id, "saved selection refers to a missing connection, clearing it");
            profiles.selected_id = None;
        }
        if persistence.is_enabled() {
            tracing::info!(
                count = profiles.records.len(),
                key = %persistence.key(),
                "connections restored"
            );
        }

        Self {
            profiles: RwLock::new(profiles),
            health: ConnectionHealth::new(),
            executor: QueryExecutor::new(transport),
            persistence,
        }
    }

    /// All connections in insertion order
    pub fn connections(&self) -> Vec<ConnectionRecord> {
        self.profiles.read().records.clone()
    }

    /// Get a connection by ID
    pub fn get_connection(&self, id: Uuid) -> Option<ConnectionRecord> {
        self.profiles.read().records.iter().find(|r| r.id == id).cloned()
    }

    pub fn selected_id(&self) -> Option<Uuid> {
        self.profiles.read().selected_id
    }

    pub fn selected_connection(&self) -> Option<ConnectionRecord> {
        self.profiles.read().selected().cloned()
    }

    /// Current persisted shape
    pub fn snapshot(&self) -> ProfilesSnapshot {
        self.profiles.read().clone()
    }

    /// Health of the selected connection
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

    /// Add a connection; the first connection added becomes selected.
    #[tracing::instrument(skip_all, fields(name = %name))]
    pub fn add_connection(&self, name: &str, endpoint_url: &str, admin_secret: &str) -> Uuid {
        let record = ConnectionRecord::new(name, endpoint_url, admin_secret);
        let id = record.id;

        let snapshot = {
            let mut profiles = self.profiles.write();
            profiles.records.push(record);
            if profiles.records.len() == 1 {
                profiles.selected_id = Some(id);
                tracing::debug!(connection_id = %id, "first connection auto-selected");
            }
            profiles.clone()
        };
        self.persistence.save(&snapshot);

        tracing::info!(connection_id = %id, has_secret = !admin_secret.is_empty(), "connection added");
        id
    }

    /// Replace a connection's fields. Unknown IDs are ignored.
    #[tracing::instrument(skip_all, fields(connection_id = %id))]
    pub fn update_connection(&self, id: Uuid, name: &str, endpoint_url: &str, admin_secret: &str) {
        let (snapshot, was_selected) = {
            let mut profiles = self.profiles.write();
            let Some(record) = profiles.records.iter_mut().find(|r| r.id == id) else {
                tracing::debug!("connection not found, nothing to update");
                return;
            };
            record.update(name, endpoint_url, admin_secret);
            let was_selected = profiles.selected_id == Some(id);
            (profiles.clone(), was_selected)
        };
        self.persistence.save(&snapshot);

        if was_selected {
            self.health.reset();
        }
        tracing::info!(selected = was_selected, "connection updated");
    }

    /// Remove a connection. Removing the selected one selects the new first
    /// connection, if any.
    #[tracing::instrument(skip_all, fields(connection_id = %id))]
    pub fn remove_connection(&self, id: Uuid) {
        let (snapshot, was_selected) = {
            let mut profiles = self.profiles.write();
            let Some(pos) = profiles.records.iter().position(|r| r.id == id) else {
                tracing::debug!("connection not found, nothing to remove");
                return;
            };
            profiles.records.remove(pos);
            let was_selected = profiles.selected_id == Some(id);
            if was_selected {
                profiles.selected_id = profiles.records.first().map(|r| r.id);
            }
            (profiles.clone(), was_selected)
        };
        self.persistence.save(&snapshot);

        if was_selected {
            self.health.reset();
        }
        tracing::info!(
            selected_id = ?snapshot.selected_id,
            remaining = snapshot.records.len(),
            "connection removed"
        );
    }

    /// Select a connection. Unknown IDs are ignored.
    #[tracing::instrument(skip_all, fields(connection_id = %id))]
    pub fn select_connection(&self, id: Uuid) {
        let snapshot = {
            let mut profiles = self.profiles.write();
            if !profiles.contains(id) {
                tracing::debug!("connection not found, selection unchanged");
                return;
            }
            if profiles.selected_id == Some(id) {
                return;
            }
            profiles.selected_id = Some(id);
            profiles.clone()
        };
        self.persistence.save(&snapshot);
        self.health.reset();
        tracing::info!("connection selected");
    }

    /// Remove every connection and delete the saved snapshot
    #[tracing::instrument(skip(self))]
    pub fn clear(&self) {
        *self.profiles.write() = ProfilesSnapshot::default();
        self.persistence.remove();
        self.health.reset();
        tracing::info!("all connections cleared");
    }

    /// Probe the selected connection with `SELECT 1`.
    ///
    /// Returns `false` without changing state when nothing usable is selected.
    #[tracing::instrument(skip_all, fields(connection_id = ?self.selected_id()))]
    pub async fn test_connection(&self) -> bool {
        let target = self.active_target();
        self.health.test(&self.executor, target).await
    }

    /// Run a GraphQL query against the selected connection
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

    /// Run raw SQL against the selected connection
    pub async fn execute_sql(&self, sql: &str, options: SqlOptions) -> QueryResult<SqlPayload> {
        let target = self.active_target();
        self.executor.execute_sql(target.as_ref(), sql, options).await
    }

    fn active_target(&self) -> Option<ConnectionTarget> {
        self.profiles
            .read()
            .selected()
            .map(ConnectionRecord::target)
            .filter(ConnectionTarget::is_configured)
    }
}
