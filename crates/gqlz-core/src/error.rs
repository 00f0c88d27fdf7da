//! Error types for GQLZ

use thiserror::Error;

use crate::FaultSource;

/// Core error type for GQLZ operations
#[derive(Error, Debug)]
pub enum GqlzError {
    /// The request never produced an HTTP response
    #[error("{0}")]
    Transport(String),

    /// The response body could not be read as the expected JSON
    #[error("{0}")]
    Decode(String),

    /// The response body did not match the expected schema
    #[error("{0}")]
    Validation(String),

    /// The gateway reported GraphQL errors
    #[error("{0}")]
    GraphQl(String),

    /// The gateway reported a SQL execution error
    #[error("{0}")]
    Sql(String),

    #[error("No server selected")]
    NoServerSelected,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl GqlzError {
    /// Category a fault built from this error is reported under.
    ///
    /// Errors that carry no classification of their own are reported as
    /// transport faults, since they can only arise around the network call.
    pub fn fault_source(&self) -> FaultSource {
        match self {
            GqlzError::Transport(_) | GqlzError::Io(_) | GqlzError::Other(_) => {
                FaultSource::Transport
            }
            GqlzError::Decode(_) | GqlzError::Serialization(_) => FaultSource::Decode,
            GqlzError::Validation(_) | GqlzError::NoServerSelected | GqlzError::Storage(_) => {
                FaultSource::Validation
            }
            GqlzError::GraphQl(_) => FaultSource::GatewayGraphql,
            GqlzError::Sql(_) => FaultSource::GatewaySql,
        }
    }
}

/// Result type alias for GQLZ operations
pub type Result<T> = std::result::Result<T, GqlzError>;
