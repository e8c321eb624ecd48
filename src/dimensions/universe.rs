// src/dimensions/universe.rs

use std::collections::{BTreeMap, BTreeSet};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::dimensions::DimensionSet;
use crate::errors::{GraphBuilderError, Result};

/// A named coordinate axis and the dimensions it requires.
///
/// For example `visit` requires `instrument`: a visit number only means
/// something together with the instrument that took it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    pub name: String,
    pub requires: Vec<String>,
}

impl Dimension {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requires: Vec::new(),
        }
    }

    pub fn requiring<I, S>(mut self, requires: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requires.extend(requires.into_iter().map(Into::into));
        self
    }
}

/// Every dimension known to a catalog.
#[derive(Debug, Clone, Default)]
pub struct DimensionUniverse {
    dimensions: BTreeMap<String, Dimension>,
}

impl DimensionUniverse {
    /// Build a universe, checking that every `requires` entry is known and
    /// that the requirement graph is acyclic.
    pub fn new(dimensions: impl IntoIterator<Item = Dimension>) -> Result<Self> {
        let dimensions: BTreeMap<String, Dimension> = dimensions
            .into_iter()
            .map(|d| (d.name.clone(), d))
            .collect();

        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        for name in dimensions.keys() {
            graph.add_node(name.as_str());
        }
        for dim in dimensions.values() {
            for req in dim.requires.iter() {
                if !dimensions.contains_key(req) {
                    return Err(GraphBuilderError::ConfigError(format!(
                        "dimension '{}' requires unknown dimension '{}'",
                        dim.name, req
                    )));
                }
                graph.add_edge(req.as_str(), dim.name.as_str(), ());
            }
        }

        if let Err(cycle) = toposort(&graph, None) {
            return Err(GraphBuilderError::ConfigError(format!(
                "cycle in dimension requirements involving '{}'",
                cycle.node_id()
            )));
        }

        Ok(Self { dimensions })
    }

    pub fn get(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.dimensions.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.dimensions.keys().map(|s| s.as_str())
    }

    /// Validate a list of names and collect them into a [`DimensionSet`].
    pub fn dimension_set<I, S>(&self, names: I) -> Result<DimensionSet>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = DimensionSet::empty();
        for name in names {
            let name = name.as_ref();
            if !self.contains(name) {
                return Err(GraphBuilderError::UnknownDimension(name.to_string()));
            }
            set.insert(name);
        }
        Ok(set)
    }

    /// Link dimensions of `name`: everything it transitively requires,
    /// followed by the dimension itself.
    ///
    /// Required dimensions come first (depth-first, in declaration order),
    /// so `visit` yields `[instrument, visit]`.
    pub fn links(&self, name: &str) -> Result<Vec<String>> {
        let mut out = Vec::new();
        let mut seen = BTreeSet::new();
        self.collect_links(name, &mut out, &mut seen)?;
        Ok(out)
    }

    /// Ordered, duplicate-free union of [`links`](Self::links) over several
    /// dimensions. This is the key that quanta are grouped by.
    pub fn links_of_all<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<String>> {
        let mut out = Vec::new();
        let mut seen = BTreeSet::new();
        for name in names {
            self.collect_links(name.as_ref(), &mut out, &mut seen)?;
        }
        Ok(out)
    }

    fn collect_links(
        &self,
        name: &str,
        out: &mut Vec<String>,
        seen: &mut BTreeSet<String>,
    ) -> Result<()> {
        let dim = self
            .get(name)
            .ok_or_else(|| GraphBuilderError::UnknownDimension(name.to_string()))?;
        if seen.contains(name) {
            return Ok(());
        }
        for req in dim.requires.iter() {
            self.collect_links(req, out, seen)?;
        }
        if seen.insert(name.to_string()) {
            out.push(name.to_string());
        }
        Ok(())
    }
}
