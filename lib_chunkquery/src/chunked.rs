//! # Chunked Retrieval Loop
//!
//! MSQL endpoints time out on large queries, so a query is walked in bounded
//! windows: fetch a page, transform it, advance the offset by the number of
//! rows that actually came back, and stop when
//!
//! - `max_pages` pages have been fetched, or
//! - a page returned strictly fewer rows than `limit_per_page`.
//!
//! The second rule assumes the endpoint never returns a short page before the
//! end of the data. If it does, the retrieval ends there.
//!
//! A failed page aborts the whole call; nothing transformed so far is returned.

use tracing::{debug, info};

use crate::envelope::PageEnvelope;
use crate::error::ChunkQueryError;
use crate::fetcher::PageFetcher;
use crate::query::Query;
use crate::retry::RetryPolicy;
use crate::transform::{Page, PageTransform};
use crate::transport::QueryTransport;

/// Result of one full retrieval.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalReport<T> {
    /// Transformed items, in server order.
    pub items: Vec<T>,
    /// Pages fetched, including a final empty page.
    pub pages_fetched: usize,
    /// Offset right after the last row received.
    pub next_offset: usize,
    /// `true` when the last page was short, i.e. the data ran out before the page cap.
    pub exhausted: bool,
}

/// Walks the full result set of a query through sequential page fetches.
#[derive(Debug, Clone)]
pub struct ChunkedRetrieval<T> {
    fetcher: PageFetcher<T>,
}

impl<T: QueryTransport> ChunkedRetrieval<T> {
    /// Retrieval over `transport` with the given retry policy.
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self {
            fetcher: PageFetcher::new(transport, policy),
        }
    }

    /// Retrieval over an existing fetcher.
    pub fn from_fetcher(fetcher: PageFetcher<T>) -> Self {
        Self { fetcher }
    }

    /// The page fetcher used for every request.
    pub fn fetcher(&self) -> &PageFetcher<T> {
        &self.fetcher
    }

    /// Fetches and transforms every page of `query`.
    pub async fn get_all<P: PageTransform>(
        &self,
        query: &Query,
        transform: &P,
    ) -> Result<Vec<P::Item>, ChunkQueryError> {
        Ok(self.get_all_with_report(query, transform).await?.items)
    }

    /// Like [`get_all`](Self::get_all), also reporting how far the retrieval got.
    pub async fn get_all_with_report<P: PageTransform>(
        &self,
        query: &Query,
        transform: &P,
    ) -> Result<RetrievalReport<P::Item>, ChunkQueryError> {
        let paging = query.paging();
        let limit = paging.limit_per_page();
        let verbose = query.verbose();

        if verbose {
            info!(query = query.text(), "running chunked query");
        }

        let mut offset = paging.start_offset();
        let mut pages_fetched = 0;
        let mut items = Vec::new();

        loop {
            let rows = match self.fetcher.fetch(query.text(), offset, limit, verbose).await? {
                PageEnvelope::Success { rows } => rows,
                PageEnvelope::Failure { detail } => {
                    return Err(ChunkQueryError::EndpointQuery { detail });
                }
            };
            let returned = rows.len();
            let page = Page {
                offset,
                index: pages_fetched,
                rows,
            };
            pages_fetched += 1;

            let transformed = transform
                .transform_page(page)
                .map_err(|source| ChunkQueryError::Transform {
                    page_offset: offset,
                    source,
                })?;
            items.extend(transformed);
            offset += returned;

            debug!(
                pages_fetched,
                returned,
                next_offset = offset,
                total = items.len(),
                "page transformed"
            );

            let exhausted = returned < limit;
            if exhausted || paging.max_pages() == Some(pages_fetched) {
                if verbose {
                    info!(pages_fetched, rows = items.len(), exhausted, "chunked query finished");
                }
                return Ok(RetrievalReport {
                    items,
                    pages_fetched,
                    next_offset: offset,
                    exhausted,
                });
            }
        }
    }
}

/// Capability of a service that supports paginated querying with a transform.
///
/// A service owns a [`ChunkedRetrieval`] and supplies its own row conversion
/// by implementing [`PageTransform`]; `get_long_query` then drives the loop.
#[allow(async_fn_in_trait)]
pub trait ChunkQuery: PageTransform {
    /// Transport used by the service.
    type Transport: QueryTransport;

    /// The retrieval loop the service queries through.
    fn retrieval(&self) -> &ChunkedRetrieval<Self::Transport>;

    /// Fetches every page of `query` and converts it with this service's transform.
    async fn get_long_query(&self, query: &Query) -> Result<Vec<Self::Item>, ChunkQueryError>
    where
        Self: Sized,
    {
        self.retrieval().get_all(query, self).await
    }
}
