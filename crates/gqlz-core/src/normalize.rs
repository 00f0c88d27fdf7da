//! Result normalizer
//!
//! Turns a fallible async operation into a [`QueryResult`] so that no error
//! ever crosses the store boundary.

use std::future::Future;

use crate::{Fault, QueryResult, Result};

/// Await `operation` once and fold its outcome into a tagged result.
///
/// Errors raised by the operation body itself (for example a gateway error
/// detected while decoding) are converted exactly like transport errors.
pub async fn normalize<T, F>(operation: F) -> QueryResult<T>
where
    F: Future<Output = Result<T>>,
{
    match operation.await {
        Ok(payload) => QueryResult::Success(payload),
        Err(error) => {
            let fault = Fault::from(&error);
            tracing::debug!(source = %fault.source, error = %fault.message, "operation failed");
            QueryResult::Failure(fault)
        }
    }
}
