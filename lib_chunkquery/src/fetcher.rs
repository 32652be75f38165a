//! # Retrying Page Fetcher
//!
//! Issues one bounded query window through a `QueryTransport`, retrying every
//! transport failure under a `RetryPolicy`, and decodes the response once into
//! a `PageEnvelope`.

use std::time::Instant;

use chrono::Local;
use tracing::{debug, info};

use crate::envelope::PageEnvelope;
use crate::error::ChunkQueryError;
use crate::retry::RetryPolicy;
use crate::transport::QueryTransport;

/// Fetches single pages with a fixed retry budget.
#[derive(Debug, Clone)]
pub struct PageFetcher<T> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: QueryTransport> PageFetcher<T> {
    /// Wraps `transport` with `policy`.
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The retry policy applied to every fetch.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches rows `[offset, offset + limit)` of `query`.
    ///
    /// Fails with `RetriesExhausted` once every attempt has failed. A decoded
    /// `Failure` envelope is a successful fetch; judging it is up to the caller.
    pub async fn fetch(
        &self,
        query: &str,
        offset: usize,
        limit: usize,
        verbose: bool,
    ) -> Result<PageEnvelope, ChunkQueryError> {
        if verbose {
            info!(offset, limit, "[start: {offset} limit: {limit}]");
        } else {
            debug!(offset, limit, "fetching page");
        }

        let raw = self
            .policy
            .run(|attempt| async move {
                let started_at = Local::now();
                let clock = Instant::now();
                let result = self.transport.execute_query(query, offset, limit).await;
                let elapsed_ms = clock.elapsed().as_millis() as u64;
                if verbose {
                    info!(
                        attempt,
                        elapsed_ms,
                        ok = result.is_ok(),
                        "[{} - {}]",
                        started_at.format("%Y-%m-%d %H:%M:%S%.3f"),
                        Local::now().format("%Y-%m-%d %H:%M:%S%.3f")
                    );
                } else {
                    debug!(attempt, elapsed_ms, ok = result.is_ok(), "page attempt finished");
                }
                result
            })
            .await
            .map_err(|exhausted| ChunkQueryError::RetriesExhausted {
                attempts: exhausted.attempts,
                source: exhausted.last_error,
            })?;

        Ok(PageEnvelope::decode(raw))
    }
}
