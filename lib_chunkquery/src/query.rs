//! # Query and Paging Parameters
//!
//! A `Query` is the opaque MSQL text plus the paging parameters that drive the
//! chunked retrieval. Both are immutable once built; all range checks happen
//! at construction so the retrieval loop never sees a zero page size.

use crate::error::ChunkQueryError;

/// Rows requested per page when the caller does not say otherwise.
pub const DEFAULT_LIMIT_PER_PAGE: usize = 100;

/// Paging parameters for one chunked retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    start_offset: usize,
    limit_per_page: usize,
    max_pages: Option<usize>,
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            start_offset: 0,
            limit_per_page: DEFAULT_LIMIT_PER_PAGE,
            max_pages: None,
        }
    }
}

impl Paging {
    /// Builds paging parameters, rejecting a zero page size or a zero page cap.
    pub fn new(
        start_offset: usize,
        limit_per_page: usize,
        max_pages: Option<usize>,
    ) -> Result<Self, ChunkQueryError> {
        if limit_per_page == 0 {
            return Err(ChunkQueryError::InvalidPaging(
                "limit_per_page must be greater than zero".to_string(),
            ));
        }
        if max_pages == Some(0) {
            return Err(ChunkQueryError::InvalidPaging(
                "max_pages must be greater than zero when set".to_string(),
            ));
        }
        Ok(Self {
            start_offset,
            limit_per_page,
            max_pages,
        })
    }

    /// Index of the first record requested.
    pub fn start_offset(&self) -> usize {
        self.start_offset
    }

    /// Rows requested per page.
    pub fn limit_per_page(&self) -> usize {
        self.limit_per_page
    }

    /// Maximum number of pages to fetch; `None` is unbounded.
    pub fn max_pages(&self) -> Option<usize> {
        self.max_pages
    }
}

/// An MSQL query with its paging parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    text: String,
    paging: Paging,
    verbose: bool,
}

impl Query {
    /// A query with default paging: offset 0, 100 rows per page, no page cap.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            paging: Paging::default(),
            verbose: false,
        }
    }

    /// Starts a builder for a query with custom paging.
    pub fn builder(text: impl Into<String>) -> QueryBuilder {
        QueryBuilder {
            text: text.into(),
            start_offset: 0,
            limit_per_page: DEFAULT_LIMIT_PER_PAGE,
            max_pages: None,
            verbose: false,
        }
    }

    /// Builds a query from already validated paging.
    pub fn with_paging(text: impl Into<String>, paging: Paging, verbose: bool) -> Self {
        Self {
            text: text.into(),
            paging,
            verbose,
        }
    }

    /// The query text, passed to the endpoint untouched.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The paging parameters.
    pub fn paging(&self) -> &Paging {
        &self.paging
    }

    /// Whether progress should be logged at `info` level.
    pub fn verbose(&self) -> bool {
        self.verbose
    }
}

/// Builder for [`Query`].
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    text: String,
    start_offset: usize,
    limit_per_page: usize,
    max_pages: Option<usize>,
    verbose: bool,
}

impl QueryBuilder {
    /// Sets the first record to request.
    pub fn start_offset(mut self, start_offset: usize) -> Self {
        self.start_offset = start_offset;
        self
    }

    /// Sets the number of rows requested per page.
    pub fn limit_per_page(mut self, limit_per_page: usize) -> Self {
        self.limit_per_page = limit_per_page;
        self
    }

    /// Caps the number of pages fetched.
    pub fn max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    /// Logs progress at `info` level.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Validates the paging parameters and builds the query.
    pub fn build(self) -> Result<Query, ChunkQueryError> {
        let paging = Paging::new(self.start_offset, self.limit_per_page, self.max_pages)?;
        Ok(Query {
            text: self.text,
            paging,
            verbose: self.verbose,
        })
    }
}
