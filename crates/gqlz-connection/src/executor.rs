//! Query executor
//!
//! Sends GraphQL and raw SQL requests to a connection target and tracks the
//! loading flag and last fault shared by everything a store runs.

use parking_lot::RwLock;
use std::sync::Arc;

use gqlz_core::request::{GRAPHQL_PATH, GraphQlRequest, RunSqlRequest, SQL_PATH, endpoint};
use gqlz_core::{
    Fault, GatewayTransport, GqlzError, GraphQlVariables, QueryResult, SqlOptions, SqlPayload,
    decode_graphql, decode_sql, normalize,
};

use crate::ConnectionTarget;

#[derive(Debug, Default)]
struct QueryActivity {
    is_loading: bool,
    last_error: Option<Fault>,
}

/// Executes queries and records their outcome.
///
/// Concurrent calls are not serialized; whichever completes last decides
/// `is_loading` and `last_error`.
pub struct QueryExecutor {
    transport: Arc<dyn GatewayTransport>,
    activity: RwLock<QueryActivity>,
}

impl QueryExecutor {
    pub fn new(transport: Arc<dyn GatewayTransport>) -> Self {
        Self {
            transport,
            activity: RwLock::new(QueryActivity::default()),
        }
    }

    /// Whether a query is in flight
    pub fn is_loading(&self) -> bool {
        self.activity.read().is_loading
    }

    /// Fault of the most recent query, `None` if it succeeded
    pub fn last_error(&self) -> Option<Fault> {
        self.activity.read().last_error.clone()
    }

    /// Run a GraphQL query against `target`.
    ///
    /// Without a target this fails with "No server selected" and sends nothing.
    #[tracing::instrument(skip_all, fields(endpoint = target.map(|t| t.endpoint_url.as_str())))]
    pub async fn execute_graphql(
        &self,
        target: Option<&ConnectionTarget>,
        query: &str,
        variables: &GraphQlVariables,
    ) -> QueryResult<serde_json::Value> {
        let Some(target) = target else {
            return self.finish(QueryResult::from(Err(GqlzError::NoServerSelected)));
        };

        self.begin();
        let result = normalize(async {
            let body = serde_json::to_value(GraphQlRequest { query, variables })?;
            let response = self
                .transport
                .post_json(
                    &endpoint(&target.endpoint_url, GRAPHQL_PATH),
                    &target.admin_secret,
                    &body,
                )
                .await?;
            if !response.is_success() {
                tracing::debug!(status = response.status, "GraphQL endpoint returned non-success status");
            }
            decode_graphql(&response.body)
        })
        .await;
        self.finish(result)
    }

    /// Run raw SQL against `target`, read-only unless `options` allow mutations.
    ///
    /// Without a target this fails with "No server selected" and sends nothing.
    #[tracing::instrument(skip_all, fields(endpoint = target.map(|t| t.endpoint_url.as_str()), read_only = !options.allow_mutations))]
    pub async fn execute_sql(
        &self,
        target: Option<&ConnectionTarget>,
        sql: &str,
        options: SqlOptions,
    ) -> QueryResult<SqlPayload> {
        let Some(target) = target else {
            return self.finish(QueryResult::from(Err(GqlzError::NoServerSelected)));
        };

        self.begin();
        let result = normalize(async {
            let body = serde_json::to_value(RunSqlRequest::new(sql, options.allow_mutations))?;
            let response = self
                .transport
                .post_json(
                    &endpoint(&target.endpoint_url, SQL_PATH),
                    &target.admin_secret,
                    &body,
                )
                .await?;
            decode_sql(response.status, &response.body)
        })
        .await;
        self.finish(result)
    }

    fn begin(&self) {
        self.activity.write().is_loading = true;
    }

    fn finish<T>(&self, result: QueryResult<T>) -> QueryResult<T> {
        let mut activity = self.activity.write();
        activity.is_loading = false;
        activity.last_error = result.fault().cloned();
        if let Some(fault) = &activity.last_error {
            tracing::debug!(source = %fault.source, error = %fault.message, "query failed");
        }
        result
    }
}
