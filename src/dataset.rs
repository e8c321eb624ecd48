// src/dataset.rs

//! Dataset types and dataset references.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Deserialize;

use crate::dimensions::{DataId, DimensionSet};

/// Canonical dataset type name used throughout the builder.
pub type DatasetTypeName = String;

/// A named class of data product with its dimension signature.
///
/// Equality, ordering and hashing use the name only: two tasks declaring
/// `calexp` refer to the same dataset type.
#[derive(Debug, Clone)]
pub struct DatasetType {
    name: DatasetTypeName,
    dimensions: DimensionSet,
}

impl DatasetType {
    pub fn new(name: impl Into<String>, dimensions: DimensionSet) -> Self {
        Self {
            name: name.into(),
            dimensions,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimensions(&self) -> &DimensionSet {
        &self.dimensions
    }
}

impl PartialEq for DatasetType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for DatasetType {}

impl Hash for DatasetType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for DatasetType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DatasetType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

/// Lets name-keyed collections of dataset types be queried by `&str`.
impl Borrow<str> for DatasetType {
    fn borrow(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for DatasetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Identifier of a dataset persisted in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct DatasetId(pub u64);

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A concrete dataset: a type bound to coordinates.
///
/// `id` is `Some` exactly when the dataset already exists in storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRef {
    dataset_type: DatasetType,
    data_id: DataId,
    id: Option<DatasetId>,
}

impl DatasetRef {
    /// A reference to a dataset that does not exist yet.
    pub fn new(dataset_type: DatasetType, data_id: DataId) -> Self {
        Self {
            dataset_type,
            data_id,
            id: None,
        }
    }

    /// A reference to an existing dataset.
    pub fn resolved(dataset_type: DatasetType, data_id: DataId, id: DatasetId) -> Self {
        Self {
            dataset_type,
            data_id,
            id: Some(id),
        }
    }

    /// Placeholder with no coordinates, used for init-outputs.
    pub fn unbound(dataset_type: DatasetType) -> Self {
        Self::new(dataset_type, DataId::new())
    }

    pub fn dataset_type(&self) -> &DatasetType {
        &self.dataset_type
    }

    pub fn data_id(&self) -> &DataId {
        &self.data_id
    }

    pub fn id(&self) -> Option<DatasetId> {
        self.id
    }

    pub fn exists(&self) -> bool {
        self.id.is_some()
    }
}

impl fmt::Display for DatasetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.dataset_type.name, self.data_id)?;
        if let Some(id) = self.id {
            write!(f, " (id={id})")?;
        }
        Ok(())
    }
}
