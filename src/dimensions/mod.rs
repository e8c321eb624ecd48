// src/dimensions/mod.rs

//! Dimensions, dimension sets and data IDs.
//!
//! - [`DimensionValue`] is a single coordinate value (integer or string).
//! - [`DataId`] maps dimension names to values, always sorted by name.
//! - [`set`] holds [`DimensionSet`], the set algebra used during
//!   reconciliation.
//! - [`universe`] holds the catalog's dimension name-space and the "link"
//!   computation used to key quanta.

pub mod set;
pub mod universe;

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

pub use set::DimensionSet;
pub use universe::{Dimension, DimensionUniverse};

/// A single coordinate value along a dimension.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(untagged)]
pub enum DimensionValue {
    Int(i64),
    Str(String),
}

impl DimensionValue {
    /// Parse a literal as written in a query expression.
    ///
    /// Quoted literals are always strings; bare literals are integers when
    /// they parse as one.
    pub fn parse_literal(s: &str) -> Self {
        let s = s.trim();
        for quote in ['\'', '"'] {
            if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
                return DimensionValue::Str(s[1..s.len() - 1].to_string());
            }
        }
        match s.parse::<i64>() {
            Ok(n) => DimensionValue::Int(n),
            Err(_) => DimensionValue::Str(s.to_string()),
        }
    }
}

impl fmt::Display for DimensionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimensionValue::Int(n) => write!(f, "{n}"),
            DimensionValue::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for DimensionValue {
    fn from(n: i64) -> Self {
        DimensionValue::Int(n)
    }
}

impl From<i32> for DimensionValue {
    fn from(n: i32) -> Self {
        DimensionValue::Int(i64::from(n))
    }
}

impl From<&str> for DimensionValue {
    fn from(s: &str) -> Self {
        DimensionValue::Str(s.to_string())
    }
}

impl From<String> for DimensionValue {
    fn from(s: String) -> Self {
        DimensionValue::Str(s)
    }
}

/// Concrete coordinates of a dataset or a catalog row.
///
/// Backed by a `BTreeMap`, so iteration (and therefore equality, ordering
/// and display) is always by dimension name. This is the identity used to
/// deduplicate dataset references.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct DataId(BTreeMap<String, DimensionValue>);

impl DataId {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert, handy in tests and fixtures.
    pub fn with(mut self, dimension: &str, value: impl Into<DimensionValue>) -> Self {
        self.0.insert(dimension.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, dimension: impl Into<String>, value: DimensionValue) {
        self.0.insert(dimension.into(), value);
    }

    pub fn get(&self, dimension: &str) -> Option<&DimensionValue> {
        self.0.get(dimension)
    }

    pub fn contains(&self, dimension: &str) -> bool {
        self.0.contains_key(dimension)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DimensionValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Names of the dimensions this data ID binds.
    pub fn dimensions(&self) -> DimensionSet {
        DimensionSet::from_names(self.0.keys().cloned())
    }

    /// Keep only the coordinates for dimensions in `dimensions`.
    ///
    /// Dimensions absent from `self` are silently left out.
    pub fn restrict(&self, dimensions: &DimensionSet) -> DataId {
        DataId(
            self.0
                .iter()
                .filter(|(k, _)| dimensions.contains(k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    /// Project onto an ordered list of dimensions.
    ///
    /// Returns `None` if any of them is missing from this data ID.
    pub fn project(&self, dimensions: &[String]) -> Option<Vec<(String, DimensionValue)>> {
        dimensions
            .iter()
            .map(|d| self.0.get(d).map(|v| (d.clone(), v.clone())))
            .collect()
    }

    /// `true` if every coordinate of `other` is present in `self` with the
    /// same value.
    pub fn is_superset_of(&self, other: &DataId) -> bool {
        other.iter().all(|(k, v)| self.get(k) == Some(v))
    }
}

impl FromIterator<(String, DimensionValue)> for DataId {
    fn from_iter<I: IntoIterator<Item = (String, DimensionValue)>>(iter: I) -> Self {
        DataId(iter.into_iter().collect())
    }
}

impl fmt::Display for DataId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{k}: {v}")?;
        }
        write!(f, "}}")
    }
}
