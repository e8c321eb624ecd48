// src/dimensions/set.rs

use std::collections::BTreeSet;
use std::fmt;

/// An ordered set of dimension names.
///
/// Membership is by name only; validation against a
/// [`DimensionUniverse`](super::DimensionUniverse) happens when sets are
/// built from task declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DimensionSet(BTreeSet<String>);

impl DimensionSet {
    pub fn empty() -> Self {
        Self(BTreeSet::new())
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.0.insert(name.into())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|s| s.as_str())
    }

    pub fn union(&self, other: &DimensionSet) -> DimensionSet {
        Self(self.0.union(&other.0).cloned().collect())
    }

    /// Union of an arbitrary number of sets.
    pub fn union_all<'a, I>(sets: I) -> DimensionSet
    where
        I: IntoIterator<Item = &'a DimensionSet>,
    {
        let mut out = BTreeSet::new();
        for set in sets {
            out.extend(set.0.iter().cloned());
        }
        Self(out)
    }

    pub fn difference(&self, other: &DimensionSet) -> DimensionSet {
        Self(self.0.difference(&other.0).cloned().collect())
    }

    pub fn intersection(&self, other: &DimensionSet) -> DimensionSet {
        Self(self.0.intersection(&other.0).cloned().collect())
    }

    pub fn is_disjoint(&self, other: &DimensionSet) -> bool {
        self.0.is_disjoint(&other.0)
    }

    pub fn names(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl fmt::Display for DimensionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, name) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}")?;
        }
        write!(f, "}}")
    }
}

impl<'a> FromIterator<&'a str> for DimensionSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self::from_names(iter)
    }
}
