//! # Query Transport
//!
//! The transport owns connection setup, authentication and the wire protocol.
//! The retrieval core only needs one operation from it: run a query for one
//! `(start_record, limit)` window and hand back the raw JSON response.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;

use crate::error::TransportError;

/// Anything that can execute an MSQL query window against the endpoint.
///
/// Implementations must be usable through a shared reference; concurrent
/// retrievals over one transport are allowed when the transport allows them.
pub trait QueryTransport {
    /// Executes `query` for rows `[start_record, start_record + limit)`.
    fn execute_query(
        &self,
        query: &str,
        start_record: usize,
        limit: usize,
    ) -> impl Future<Output = Result<Value, TransportError>> + Send;
}

impl<T: QueryTransport + Sync> QueryTransport for &T {
    fn execute_query(
        &self,
        query: &str,
        start_record: usize,
        limit: usize,
    ) -> impl Future<Output = Result<Value, TransportError>> + Send {
        (**self).execute_query(query, start_record, limit)
    }
}

impl<T: QueryTransport + Send + Sync> QueryTransport for Arc<T> {
    fn execute_query(
        &self,
        query: &str,
        start_record: usize,
        limit: usize,
    ) -> impl Future<Output = Result<Value, TransportError>> + Send {
        (**self).execute_query(query, start_record, limit)
    }
}
