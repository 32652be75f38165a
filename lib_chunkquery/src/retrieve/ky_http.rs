//! # HTTP Retrieval Utilities
//!
//! An asynchronous API client wrapper around `reqwest` with base URL joining,
//! bearer auth and standardized JSON response handling. The client itself does not retry;
//! retry policy belongs to the page fetcher that calls it.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Url};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::TransportError;

/// A standardized container for API responses.
///
/// This struct wraps the deserialized data along with the status of the
/// HTTP transaction.
#[derive(Debug)]
pub struct ApiResponse<T> {
    /// The successfully deserialized response body, if any.
    pub data: Option<T>,
    /// The raw error body returned by the server if the request failed.
    pub error_body: Option<String>,
    /// The numeric HTTP status code.
    pub status: u16,
    /// Indicates if the status code was in the 2xx range.
    pub success: bool,
}

/// A flexible asynchronous HTTP client.
///
/// Handles base URLs and authentication tokens on top of a pooled
/// `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// The underlying connection-pooling client.
    inner: Client,
    /// The base URL to which all relative paths are joined.
    base_url: Url,
    /// An optional Bearer token used for authorization.
    auth_token: Option<String>,
}

impl ApiClient {
    /// Creates a new `ApiClient`.
    ///
    /// # Arguments
    /// * `base_url` - The absolute base URL for the API (e.g., "https://soap.membersuite.com/").
    /// * `auth_token` - An optional string for the Authorization header.
    /// * `timeout` - An optional per-request timeout.
    ///
    /// # Errors
    /// Fails if `base_url` is not a valid absolute URL or the client cannot be built.
    pub fn new(
        base_url: &str,
        auth_token: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, TransportError> {
        let url = Url::parse(base_url)
            .map_err(|e| TransportError::other(format!("invalid base URL {base_url}: {e}")))?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            inner: builder.build()?,
            base_url: url,
            auth_token,
        })
    }

    /// The base URL relative paths are joined to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Performs a generic HTTP request and handles the response.
    ///
    /// # Arguments
    /// * `method` - The HTTP verb (GET, POST, etc.).
    /// * `path` - The relative path to append to the base URL.
    /// * `body` - Optional serializable object to send as the JSON body.
    ///
    /// # Errors
    /// Fails if URL joining, network execution or JSON decoding of a 2xx body
    /// fails. Non-2xx statuses are returned as `success: false`.
    pub async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<ApiResponse<T>, TransportError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        // 1. Construct the full absolute URL
        let full_url = self
            .base_url
            .join(path)
            .map_err(|e| TransportError::other(format!("invalid path {path}: {e}")))?;
        let mut req = self.inner.request(method, full_url);

        // 2. Inject Bearer Authentication if a token is present
        if let Some(token) = &self.auth_token {
            req = req.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        // 3. Serialize and attach the JSON body if present
        if let Some(b) = body {
            let json_body = serde_json::to_string(b)?;
            req = req.header(CONTENT_TYPE, "application/json").body(json_body);
        }

        // 4. Execute the request and capture response metadata
        let response: reqwest::Response = req.send().await?;
        let status = response.status();

        // 5. Handle the result based on success status
        if status.is_success() {
            let text = response.text().await?;
            let data = serde_json::from_str::<T>(&text)?;
            Ok(ApiResponse {
                data: Some(data),
                error_body: None,
                status: status.as_u16(),
                success: true,
            })
        } else {
            // Capture the error body as a string for debugging
            let error_text = response.text().await.ok();
            Ok(ApiResponse {
                data: None,
                error_body: error_text,
                status: status.as_u16(),
                success: false,
            })
        }
    }
}
