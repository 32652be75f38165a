//! # Data Retrieval Module
//!
//! HTTP plumbing for reaching an MSQL endpoint.
//!
//! ## Contained Modules:
//!
//! - **`ky_http`**: A generic HTTP `ApiClient` built on `reqwest` with base URL
//!   joining, bearer auth and JSON bodies.
//! - **`msql_http`**: `MsqlHttpTransport`, the `QueryTransport` that posts
//!   query windows to an `ExecuteMSQL` endpoint through `ApiClient`.

/// Generic HTTP API client for JSON endpoints.
pub mod ky_http;
/// `QueryTransport` implementation for `ExecuteMSQL` over HTTP.
pub mod msql_http;

pub use ky_http::{ApiClient, ApiResponse};
pub use msql_http::{MsqlHttpTransport, DEFAULT_EXECUTE_PATH};
