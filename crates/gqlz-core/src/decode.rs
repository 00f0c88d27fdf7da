//! Response decoder
//!
//! Validates gateway responses against the shapes the store expects. A body
//! that does not match is reported as an error, never passed through.

use serde::Deserialize;
use serde_json::Value;

use crate::{GqlzError, Result, SqlPayload, SqlRow};

/// Fallback message when the gateway's first GraphQL error has no message
pub const GRAPHQL_FALLBACK_MESSAGE: &str = "GraphQL query failed";

/// Fallback message when the gateway's SQL error body has an empty `error`
pub const SQL_FALLBACK_MESSAGE: &str = "SQL query failed";

/// Error body returned by the SQL endpoint on a non-success status
#[derive(Debug, Clone, Deserialize)]
pub struct SqlErrorBody {
    pub error: String,
    pub path: String,
    pub code: String,
    #[serde(default)]
    pub internal: Option<SqlInternalError>,
}

/// Diagnostic block the gateway attaches to database errors
#[derive(Debug, Clone, Deserialize)]
pub struct SqlInternalError {
    #[serde(default)]
    pub error: Option<PostgresErrorDetail>,
}

/// Database error as reported inside the diagnostic block
#[derive(Debug, Clone, Deserialize)]
pub struct PostgresErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status_code: Option<String>,
}

impl SqlErrorBody {
    fn database_error(&self) -> Option<&PostgresErrorDetail> {
        self.internal.as_ref()?.error.as_ref()
    }
}

#[derive(Debug, Deserialize)]
enum SqlResultType {
    TuplesOk,
}

#[derive(Debug, Deserialize)]
struct SqlSuccessBody {
    #[allow(dead_code)]
    result_type: SqlResultType,
    result: Vec<SqlRow>,
}

/// Decode the raw body of a GraphQL response.
pub fn decode_graphql(body: &str) -> Result<Value> {
    let envelope: Value = serde_json::from_str(body)
        .map_err(|e| GqlzError::Decode(format!("Invalid GraphQL response: {}", e)))?;
    graphql_envelope(envelope)
}

/// Extract `data` from a GraphQL envelope, or the first reported error.
///
/// Any JSON value is accepted. A missing `data` field decodes to `null`.
pub fn graphql_envelope(envelope: Value) -> Result<Value> {
    if let Some(first) = envelope
        .get("errors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.first())
    {
        let message = first
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or(GRAPHQL_FALLBACK_MESSAGE);
        return Err(GqlzError::GraphQl(message.to_string()));
    }

    match envelope {
        Value::Object(mut map) => Ok(map.remove("data").unwrap_or(Value::Null)),
        _ => Ok(Value::Null),
    }
}

/// Decode a SQL endpoint response given its HTTP status.
pub fn decode_sql(status: u16, body: &str) -> Result<SqlPayload> {
    if !(200..300).contains(&status) {
        let error: SqlErrorBody = serde_json::from_str(body).map_err(|e| {
            GqlzError::Validation(format!("Invalid SQL error response: {}", e))
        })?;
        let database_error = error.database_error();
        tracing::debug!(
            status,
            code = %error.code,
            path = %error.path,
            db_message = database_error.and_then(|e| e.message.as_deref()),
            db_status = database_error.and_then(|e| e.status_code.as_deref()),
            "gateway rejected SQL request"
        );
        let message = if error.error.is_empty() {
            SQL_FALLBACK_MESSAGE.to_string()
        } else {
            error.error
        };
        return Err(GqlzError::Sql(message));
    }

    let success: SqlSuccessBody = serde_json::from_str(body)
        .map_err(|e| GqlzError::Validation(format!("Invalid SQL response: {}", e)))?;
    Ok(SqlPayload::Rows {
        rows: success.result,
    })
}
