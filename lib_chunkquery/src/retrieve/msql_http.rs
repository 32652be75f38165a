//! # MSQL over HTTP
//!
//! A `QueryTransport` that posts `{query, startRecord, limitTo}` to an
//! `ExecuteMSQL` endpoint and returns the JSON response untouched. Status
//! failures and undecodable bodies are transport errors, which the page
//! fetcher retries.

use std::time::Duration;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::error::TransportError;
use crate::retrieve::ky_http::ApiClient;
use crate::transport::QueryTransport;

/// Path used when the caller does not name one.
pub const DEFAULT_EXECUTE_PATH: &str = "ExecuteMSQL";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExecuteMsqlRequest<'a> {
    query: &'a str,
    start_record: usize,
    limit_to: usize,
}

/// HTTP transport for an `ExecuteMSQL` endpoint.
#[derive(Debug, Clone)]
pub struct MsqlHttpTransport {
    client: ApiClient,
    path: String,
}

impl MsqlHttpTransport {
    /// Transport posting to `<base_url>/ExecuteMSQL`.
    pub fn new(base_url: &str, auth_token: Option<String>) -> Result<Self, TransportError> {
        Self::with_options(base_url, DEFAULT_EXECUTE_PATH, auth_token, None)
    }

    /// Transport posting to `<base_url>/<path>` with an optional request timeout.
    pub fn with_options(
        base_url: &str,
        path: &str,
        auth_token: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, TransportError> {
        Ok(Self {
            client: ApiClient::new(base_url, auth_token, timeout)?,
            path: path.to_string(),
        })
    }

    /// Path requests are posted to, relative to the base URL.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl QueryTransport for MsqlHttpTransport {
    async fn execute_query(
        &self,
        query: &str,
        start_record: usize,
        limit: usize,
    ) -> Result<Value, TransportError> {
        let body = ExecuteMsqlRequest {
            query,
            start_record,
            limit_to: limit,
        };
        let response = self
            .client
            .request::<Value, _>(Method::POST, &self.path, Some(&body))
            .await?;

        match response.data {
            Some(data) if response.success => Ok(data),
            _ => Err(TransportError::Status {
                status: response.status,
                body: response.error_body.unwrap_or_default(),
            }),
        }
    }
}
