//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use lib_chunkquery::{QueryTransport, TransportError};
use serde_json::{json, Value};

/// Builds an `ExecuteMSQL` success envelope around `rows`.
pub fn success(rows: Vec<Value>) -> Value {
    json!({
        "body": {
            "ExecuteMSQLResult": {
                "Errors": null,
                "ResultValue": {
                    "ObjectSearchResult": {
                        "Objects": { "MemberSuiteObject": rows }
                    }
                }
            }
        }
    })
}

/// Builds an envelope carrying an explicit endpoint error.
pub fn endpoint_error(message: &str) -> Value {
    json!({
        "body": {
            "ExecuteMSQLResult": {
                "Errors": { "ConciergeError": [{ "Code": "GeneralException", "Message": message }] },
                "ResultValue": null
            }
        }
    })
}

/// `count` rows numbered from `first`.
pub fn rows(first: usize, count: usize) -> Vec<Value> {
    (first..first + count).map(|n| json!({ "ID": n })).collect()
}

/// Serves a fixed data set of `total` rows, honoring offset and limit.
pub struct DataSet {
    total: usize,
    calls: Mutex<Vec<(usize, usize)>>,
}

impl DataSet {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `(start_record, limit)` of every call, in order.
    pub fn calls(&self) -> Vec<(usize, usize)> {
        self.calls.lock().unwrap().clone()
    }
}

impl QueryTransport for DataSet {
    async fn execute_query(
        &self,
        _query: &str,
        start_record: usize,
        limit: usize,
    ) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push((start_record, limit));
        let end = (start_record + limit).min(self.total);
        let count = end.saturating_sub(start_record);
        Ok(success(rows(start_record, count)))
    }
}

/// Replays scripted responses, one per call.
pub struct Scripted {
    responses: Mutex<VecDeque<Result<Value, TransportError>>>,
    calls: Mutex<Vec<(usize, usize)>>,
}

impl Scripted {
    pub fn new(responses: Vec<Result<Value, TransportError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(usize, usize)> {
        self.calls.lock().unwrap().clone()
    }
}

impl QueryTransport for Scripted {
    async fn execute_query(
        &self,
        _query: &str,
        start_record: usize,
        limit: usize,
    ) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push((start_record, limit));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::other("script exhausted")))
    }
}
