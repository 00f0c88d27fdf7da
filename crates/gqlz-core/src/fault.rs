//! Normalized failures and the tagged query result

use serde::{Deserialize, Serialize};

use crate::GqlzError;

/// Where a fault originated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FaultSource {
    /// Network failure before any HTTP response arrived
    Transport,
    /// Response body was not readable JSON
    Decode,
    /// The gateway reported GraphQL application errors
    GatewayGraphql,
    /// The gateway reported a SQL execution error
    GatewaySql,
    /// A payload did not match its schema, or a precondition was not met
    Validation,
}

impl std::fmt::Display for FaultSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FaultSource::Transport => "transport",
            FaultSource::Decode => "decode",
            FaultSource::GatewayGraphql => "gateway-graphql",
            FaultSource::GatewaySql => "gateway-sql",
            FaultSource::Validation => "validation",
        };
        f.write_str(name)
    }
}

/// A failure reduced to a message and its source category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fault {
    pub message: String,
    pub source: FaultSource,
}

impl Fault {
    pub fn new(message: impl Into<String>, source: FaultSource) -> Self {
        Self {
            message: message.into(),
            source,
        }
    }
}

impl std::fmt::Display for Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.source)
    }
}

impl From<&GqlzError> for Fault {
    fn from(error: &GqlzError) -> Self {
        Fault::new(error.to_string(), error.fault_source())
    }
}

impl From<GqlzError> for Fault {
    fn from(error: GqlzError) -> Self {
        Fault::from(&error)
    }
}

/// Outcome of a remote operation: either a payload or a fault, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult<T> {
    Success(T),
    Failure(Fault),
}

impl<T> QueryResult<T> {
    pub fn failure(message: impl Into<String>, source: FaultSource) -> Self {
        QueryResult::Failure(Fault::new(message, source))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, QueryResult::Success(_))
    }

    pub fn payload(&self) -> Option<&T> {
        match self {
            QueryResult::Success(payload) => Some(payload),
            QueryResult::Failure(_) => None,
        }
    }

    pub fn fault(&self) -> Option<&Fault> {
        match self {
            QueryResult::Success(_) => None,
            QueryResult::Failure(fault) => Some(fault),
        }
    }

    /// Map the success payload, leaving a failure untouched
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> QueryResult<U> {
        match self {
            QueryResult::Success(payload) => QueryResult::Success(f(payload)),
            QueryResult::Failure(fault) => QueryResult::Failure(fault),
        }
    }

    pub fn into_result(self) -> std::result::Result<T, Fault> {
        match self {
            QueryResult::Success(payload) => Ok(payload),
            QueryResult::Failure(fault) => Err(fault),
        }
    }
}

impl<T> From<std::result::Result<T, GqlzError>> for QueryResult<T> {
    fn from(result: std::result::Result<T, GqlzError>) -> Self {
        match result {
            Ok(payload) => QueryResult::Success(payload),
            Err(error) => QueryResult::Failure(Fault::from(&error)),
        }
    }
}
