//! # Page Transforms
//!
//! The "transform" step of the chunked retrieval: a caller-supplied
//! conversion from the raw rows of one page into domain objects. The loop
//! calls it once per fetched page, in page order.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use crate::envelope::RawRow;
use crate::error::TransformError;

/// One successfully fetched page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Offset the page was requested at.
    pub offset: usize,
    /// Zero-based position of the page within the retrieval.
    pub index: usize,
    /// Rows in server order.
    pub rows: Vec<RawRow>,
}

/// Converts the rows of one page into domain objects.
pub trait PageTransform {
    /// Domain object produced per row.
    type Item;

    /// Transforms `page`, preserving row order.
    fn transform_page(&self, page: Page) -> Result<Vec<Self::Item>, TransformError>;
}

impl<P: PageTransform + ?Sized> PageTransform for &P {
    type Item = P::Item;

    fn transform_page(&self, page: Page) -> Result<Vec<Self::Item>, TransformError> {
        (**self).transform_page(page)
    }
}

/// Passes rows through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl PageTransform for Identity {
    type Item = RawRow;

    fn transform_page(&self, page: Page) -> Result<Vec<RawRow>, TransformError> {
        Ok(page.rows)
    }
}

/// Applies a fallible closure to every row.
#[derive(Debug, Clone, Copy)]
pub struct RowFn<F>(pub F);

impl<F, T> PageTransform for RowFn<F>
where
    F: Fn(RawRow) -> Result<T, TransformError>,
{
    type Item = T;

    fn transform_page(&self, page: Page) -> Result<Vec<T>, TransformError> {
        page.rows.into_iter().map(&self.0).collect()
    }
}

/// Deserializes every row into `T` with serde.
#[derive(Debug)]
pub struct DeserializeRows<T>(PhantomData<fn() -> T>);

impl<T> DeserializeRows<T> {
    /// Creates the transform.
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for DeserializeRows<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for DeserializeRows<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> PageTransform for DeserializeRows<T> {
    type Item = T;

    fn transform_page(&self, page: Page) -> Result<Vec<T>, TransformError> {
        page.rows
            .into_iter()
            .map(|row| serde_json::from_value(row.into_value()).map_err(TransformError::from))
            .collect()
    }
}

/// A domain model that knows how to build itself from one raw row.
pub trait FromRawRow: Sized {
    /// Builds the model from `row`.
    fn from_raw_row(row: &RawRow) -> Result<Self, TransformError>;
}

/// Builds `M` from every row through [`FromRawRow`].
#[derive(Debug)]
pub struct ModelTransform<M>(PhantomData<fn() -> M>);

impl<M> ModelTransform<M> {
    /// Creates the transform.
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<M> Default for ModelTransform<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: FromRawRow> PageTransform for ModelTransform<M> {
    type Item = M;

    fn transform_page(&self, page: Page) -> Result<Vec<M>, TransformError> {
        page.rows.iter().map(M::from_raw_row).collect()
    }
}
