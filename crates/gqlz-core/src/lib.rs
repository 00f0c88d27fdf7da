//! GQLZ Core - Shared types for talking to a GraphQL/SQL gateway
//!
//! This crate provides the pieces every other GQLZ crate depends on:
//!
//! - `GqlzError` - Error type and its mapping onto fault categories
//! - `Fault` / `QueryResult` - The normalized outcome of a remote operation
//! - `normalize` - Folds a fallible async operation into a `QueryResult`
//! - `decode` - Schema checks for GraphQL and SQL response bodies
//! - `GatewayTransport` - Trait for sending requests to the gateway

pub mod decode;
mod error;
mod fault;
mod normalize;
pub mod request;
mod transport;
mod types;

pub use decode::{decode_graphql, decode_sql};
pub use error::*;
pub use fault::*;
pub use normalize::normalize;
pub use transport::*;
pub use types::*;
