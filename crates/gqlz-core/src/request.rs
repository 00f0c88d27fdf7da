//! Request bodies and endpoint paths of the gateway's HTTP API

use serde::Serialize;

use crate::GraphQlVariables;

/// Header carrying the connection secret on every request
pub const ADMIN_SECRET_HEADER: &str = "x-hasura-admin-secret";

/// Path of the GraphQL endpoint, relative to the connection's endpoint URL
pub const GRAPHQL_PATH: &str = "/v1/graphql";

/// Path of the schema/query API used for `run_sql`
pub const SQL_PATH: &str = "/v2/query";

/// Data source every SQL request targets
pub const DEFAULT_SOURCE: &str = "default";

/// Join an endpoint URL and an API path, tolerating a trailing slash on the URL.
pub fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Body of a GraphQL request
#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
    pub variables: &'a GraphQlVariables,
}

/// Body of a `run_sql` request
#[derive(Debug, Clone, Serialize)]
pub struct RunSqlRequest<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub args: RunSqlArgs<'a>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSqlArgs<'a> {
    pub source: &'static str,
    pub sql: &'a str,
    pub cascade: bool,
    pub read_only: bool,
}

impl<'a> RunSqlRequest<'a> {
    pub fn new(sql: &'a str, allow_mutations: bool) -> Self {
        Self {
            kind: "run_sql",
            args: RunSqlArgs {
                source: DEFAULT_SOURCE,
                sql,
                cascade: false,
                read_only: !allow_mutations,
            },
        }
    }
}
