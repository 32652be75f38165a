//! # Error Types
//!
//! Two layers of failure exist around a chunked query:
//!
//! - **`TransportError`**: a single attempt of the remote call failed (network,
//!   timeout, HTTP status, undecodable body). The page fetcher absorbs these
//!   with its retry policy and only surfaces them once the budget is spent.
//! - **`ChunkQueryError`**: everything that aborts a whole retrieval, including
//!   endpoint-reported query errors, which are never retried.

use serde_json::Value;
use thiserror::Error;

/// A failure from one attempt of the remote query call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransportError {
    /// Network level failure reported by the HTTP client.
    #[error("HTTP error: {message}")]
    Http {
        /// Error message.
        message: String,
        /// HTTP status code, when the client attached one.
        status: Option<u16>,
        /// Whether the request timed out.
        is_timeout: bool,
        /// Whether the connection could not be established.
        is_connect: bool,
    },

    /// The endpoint answered with a non-2xx status.
    #[error("HTTP status {status} with body: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// The response body could not be decoded as JSON.
    #[error("response decode error: {0}")]
    Decode(String),

    /// Any other transport failure (custom transports, test doubles).
    #[error("transport error: {0}")]
    Other(String),
}

impl TransportError {
    /// Shorthand for `TransportError::Other`.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

#[cfg(feature = "retrieve")]
impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http {
            message: err.to_string(),
            status: err.status().map(|status| status.as_u16()),
            is_timeout: err.is_timeout(),
            is_connect: err.is_connect(),
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// A failure raised by a caller-supplied page transform.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransformError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransformError {
    /// Creates a transform error from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an underlying error, keeping it as the source.
    pub fn wrap<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_json::Error> for TransformError {
    fn from(err: serde_json::Error) -> Self {
        Self::wrap(err)
    }
}

/// Errors that abort a chunked retrieval.
#[derive(Debug, Error)]
pub enum ChunkQueryError {
    /// Every attempt of a page fetch failed.
    #[error("page fetch failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// Number of attempts made.
        attempts: usize,
        /// Failure of the final attempt.
        #[source]
        source: TransportError,
    },

    /// The endpoint reported a query error, or the response could not be
    /// navigated to the expected result shape.
    #[error("MSQL query error: {detail}")]
    EndpointQuery {
        /// The raw envelope content, kept for diagnosis.
        detail: Value,
    },

    /// The page transform rejected a page.
    #[error("transform failed for page at offset {page_offset}: {source}")]
    Transform {
        /// Offset of the page being transformed.
        page_offset: usize,
        /// Underlying transform failure.
        #[source]
        source: TransformError,
    },

    /// Paging parameters were out of range.
    #[error("invalid paging parameters: {0}")]
    InvalidPaging(String),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ChunkQueryError {
    /// Returns `true` for errors reported by the endpoint itself.
    pub fn is_endpoint_error(&self) -> bool {
        matches!(self, Self::EndpointQuery { .. })
    }

    /// The raw envelope content of an endpoint error.
    pub fn detail(&self) -> Option<&Value> {
        match self {
            Self::EndpointQuery { detail } => Some(detail),
            _ => None,
        }
    }
}
