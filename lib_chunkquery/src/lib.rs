//! # lib_chunkquery
//!
//! Chunked MSQL query retrieval: walk the full result set of a query through
//! sequential bounded page fetches, retrying transient transport failures with
//! a fixed budget and transforming each page into domain objects as it
//! arrives.
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use lib_chunkquery::retrieve::MsqlHttpTransport;
//! use lib_chunkquery::{ChunkedRetrieval, Identity, Query, RetryPolicy};
//!
//! let transport = MsqlHttpTransport::new("https://msql.example.com/", None)?;
//! let retrieval = ChunkedRetrieval::new(transport, RetryPolicy::default());
//! let query = Query::builder("SELECT OBJECTS() FROM Individual")
//!     .limit_per_page(250)
//!     .build()?;
//! let rows = retrieval.get_all(&query, &Identity).await?;
//! println!("{} rows", rows.len());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// The chunked retrieval loop and the `ChunkQuery` service capability.
pub mod chunked;
/// Typed decoding of the MSQL response envelope.
pub mod envelope;
/// Error types for transports, transforms and retrievals.
pub mod error;
/// Single-page fetches with retry.
pub mod fetcher;
/// Query text and paging parameters.
pub mod query;
/// Fixed-delay retry policy.
pub mod retry;
/// Page transforms from raw rows to domain objects.
pub mod transform;
/// The transport seam towards the remote endpoint.
pub mod transport;

/// Layered configuration loading.
#[cfg(feature = "configs")]
pub mod configs;
/// Tracing subscriber setup.
#[cfg(feature = "loggers")]
pub mod loggers;
/// HTTP client and MSQL-over-HTTP transport.
#[cfg(feature = "retrieve")]
pub mod retrieve;

pub use chunked::{ChunkQuery, ChunkedRetrieval, RetrievalReport};
pub use envelope::{PageEnvelope, RawRow};
pub use error::{ChunkQueryError, TransformError, TransportError};
pub use fetcher::PageFetcher;
pub use query::{Paging, Query, QueryBuilder, DEFAULT_LIMIT_PER_PAGE};
pub use retry::{Exhausted, RetryPolicy, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY};
pub use transform::{DeserializeRows, FromRawRow, Identity, ModelTransform, Page, PageTransform, RowFn};
pub use transport::QueryTransport;
