// src/catalog/mod.rs

//! Catalog abstraction.
//!
//! The graph builder talks to a [`Catalog`] instead of a concrete registry.
//! The catalog owns the dimension name-space, answers the single "which
//! dimension combinations exist" query, and does point lookups for
//! init-inputs.
//!
//! - [`memory`] is an in-memory implementation, loadable from a TOML
//!   fixture via [`fixture`].
//! - [`expression`] is the small filter language understood by the
//!   in-memory catalog.
//! - [`origin`] describes the input/output collections a build reads from
//!   and writes to.

pub mod expression;
pub mod fixture;
pub mod memory;
pub mod origin;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Debug};

use thiserror::Error;

use crate::dataset::{DatasetRef, DatasetType, DatasetTypeName};
use crate::dimensions::{DataId, DimensionSet, DimensionUniverse};

pub use memory::InMemoryCatalog;
pub use origin::OriginInfo;

/// Errors raised by a catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// A dataset the query needs could not be found.
    #[error("{0}")]
    Lookup(String),

    #[error("invalid query expression '{expression}': {reason}")]
    Expression { expression: String, reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// One fully-bound combination of dimension values, with one dataset
/// reference per relevant dataset type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub data_id: DataId,
    pub dataset_refs: BTreeMap<DatasetTypeName, DatasetRef>,
}

impl Row {
    pub fn new(data_id: DataId) -> Self {
        Self {
            data_id,
            dataset_refs: BTreeMap::new(),
        }
    }

    pub fn with_ref(mut self, dataset_ref: DatasetRef) -> Self {
        self.dataset_refs
            .insert(dataset_ref.dataset_type().name().to_string(), dataset_ref);
        self
    }

    pub fn dataset_ref(&self, dataset_type: &str) -> Option<&DatasetRef> {
        self.dataset_refs.get(dataset_type)
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.data_id)?;
        for (i, r) in self.dataset_refs.values().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{r}")?;
        }
        write!(f, "]")
    }
}

/// Everything the catalog needs to enumerate candidate rows.
#[derive(Debug, Clone, Copy)]
pub struct RowQuery<'a> {
    /// Must exist in the input collections for a row to be produced.
    pub required: &'a BTreeSet<DatasetType>,
    /// Produced by the pipeline; looked up in the output collection.
    pub optional: &'a BTreeSet<DatasetType>,
    /// Must exist; absence is a lookup failure rather than a dropped row.
    pub prerequisite: &'a BTreeSet<DatasetType>,
    /// Dimensions whose values may differ between dataset types in a row.
    pub per_dataset_type_dimensions: &'a DimensionSet,
    /// User filter, in the catalog's own expression language.
    pub expression: Option<&'a str>,
    pub origin: &'a OriginInfo,
}

/// A lazy, single-pass, fallible sequence of rows.
///
/// `Err(CatalogError::Lookup)` is distinct from end-of-sequence; callers
/// stop at the first error.
pub type RowIter<'a> = Box<dyn Iterator<Item = Result<Row, CatalogError>> + Send + 'a>;

/// Dataset catalog / registry the builder queries.
pub trait Catalog: Send + Sync + Debug {
    /// Dimensions known to this catalog.
    fn universe(&self) -> &DimensionUniverse;

    /// Enumerate candidate rows. May block on I/O.
    ///
    /// Expression errors are reported up front; lookup failures are
    /// reported through the iterator.
    fn select_rows(&self, query: &RowQuery<'_>) -> Result<RowIter<'_>, CatalogError>;

    /// Find an existing dataset of `dataset_type` in `collection`.
    fn find(
        &self,
        collection: &str,
        dataset_type: &DatasetType,
    ) -> Result<Option<DatasetRef>, CatalogError>;
}
