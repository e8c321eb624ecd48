// src/catalog/expression.rs

//! Filter expressions for [`InMemoryCatalog`](super::InMemoryCatalog).
//!
//! Grammar: clauses joined by `AND` (case-insensitive), where each clause is
//! one of
//!
//! ```text
//! dim = value
//! dim != value
//! dim IN (value, value, ...)
//! ```
//!
//! Values are integers, bare words or quoted strings. `AND` and `,` inside a
//! quoted string are part of the value. An empty expression matches
//! everything.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::CatalogError;
use crate::dimensions::{DataId, DimensionUniverse, DimensionValue};

static AND_SPLIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\s+and\s+").unwrap());

static COMPARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\w+)\s*(!=|=)\s*([^=!\s].*?)\s*$").unwrap());

static MEMBERSHIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(\w+)\s+in\s*\((.*)\)\s*$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
enum Clause {
    Eq(String, DimensionValue),
    Ne(String, DimensionValue),
    In(String, Vec<DimensionValue>),
}

impl Clause {
    fn dimension(&self) -> &str {
        match self {
            Clause::Eq(d, _) | Clause::Ne(d, _) | Clause::In(d, _) => d,
        }
    }

    fn matches(&self, data_id: &DataId) -> bool {
        let Some(value) = data_id.get(self.dimension()) else {
            return false;
        };
        match self {
            Clause::Eq(_, v) => value == v,
            Clause::Ne(_, v) => value != v,
            Clause::In(_, vs) => vs.contains(value),
        }
    }
}

/// A parsed conjunction of clauses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    clauses: Vec<Clause>,
}

impl Filter {
    /// Parse `expression`, checking dimension names against `universe`.
    pub fn parse(expression: Option<&str>, universe: &DimensionUniverse) -> Result<Self, CatalogError> {
        let Some(expression) = expression.map(str::trim).filter(|e| !e.is_empty()) else {
            return Ok(Filter::default());
        };

        let invalid = |reason: String| CatalogError::Expression {
            expression: expression.to_string(),
            reason,
        };

        let mut clauses = Vec::new();
        let conjunctions = AND_SPLIT.find_iter(expression).map(|m| m.range());
        for part in split_unquoted(expression, conjunctions) {
            let clause = if let Some(caps) = MEMBERSHIP.captures(part) {
                let list = &caps[2];
                let commas = list.match_indices(',').map(|(i, _)| i..i + 1);
                let values: Vec<DimensionValue> = split_unquoted(list, commas)
                    .into_iter()
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(DimensionValue::parse_literal)
                    .collect();
                if values.is_empty() {
                    return Err(invalid(format!("empty IN list in '{}'", part.trim())));
                }
                Clause::In(caps[1].to_string(), values)
            } else if let Some(caps) = COMPARE.captures(part) {
                let value = DimensionValue::parse_literal(&caps[3]);
                match &caps[2] {
                    "=" => Clause::Eq(caps[1].to_string(), value),
                    _ => Clause::Ne(caps[1].to_string(), value),
                }
            } else {
                return Err(invalid(format!("cannot parse clause '{}'", part.trim())));
            };

            if !universe.contains(clause.dimension()) {
                return Err(invalid(format!("unknown dimension '{}'", clause.dimension())));
            }
            clauses.push(clause);
        }

        Ok(Filter { clauses })
    }

    pub fn matches(&self, data_id: &DataId) -> bool {
        self.clauses.iter().all(|c| c.matches(data_id))
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

/// Split `text` at each separator range that does not start inside a quoted
/// string.
fn split_unquoted(text: &str, separators: impl Iterator<Item = Range<usize>>) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for sep in separators {
        if !inside_quotes(&text[..sep.start]) {
            parts.push(&text[start..sep.start]);
            start = sep.end;
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Whether `prefix` ends with a quote still open.
fn inside_quotes(prefix: &str) -> bool {
    let mut open = None;
    for c in prefix.chars() {
        match open {
            Some(q) if c == q => open = None,
            None if c == '\'' || c == '"' => open = Some(c),
            _ => {}
        }
    }
    open.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimensions::Dimension;

    fn universe() -> DimensionUniverse {
        DimensionUniverse::new([
            Dimension::new("instrument"),
            Dimension::new("visit").requiring(["instrument"]),
            Dimension::new("detector").requiring(["instrument"]),
        ])
        .unwrap()
    }

    fn data_id(visit: i64, detector: i64) -> DataId {
        DataId::new()
            .with("instrument", "HSC")
            .with("visit", visit)
            .with("detector", detector)
    }

    #[test]
    fn empty_expression_matches_everything() {
        let f = Filter::parse(None, &universe()).unwrap();
        assert!(f.is_empty());
        assert!(f.matches(&data_id(1, 1)));
        assert!(Filter::parse(Some("   "), &universe()).unwrap().is_empty());
    }

    #[test]
    fn conjunction_of_clauses() {
        let f = Filter::parse(
            Some("instrument = 'HSC' AND visit IN (1, 2) and detector != 5"),
            &universe(),
        )
        .unwrap();
        assert!(f.matches(&data_id(1, 4)));
        assert!(f.matches(&data_id(2, 0)));
        assert!(!f.matches(&data_id(3, 4)));
        assert!(!f.matches(&data_id(1, 5)));
    }

    #[test]
    fn clause_on_missing_dimension_does_not_match() {
        let f = Filter::parse(Some("detector = 1"), &universe()).unwrap();
        assert!(!f.matches(&DataId::new().with("visit", 1)));
    }

    #[test]
    fn quoted_values_keep_separators() {
        let f = Filter::parse(Some("instrument = 'A and B' AND visit = 1"), &universe()).unwrap();
        let id = DataId::new().with("instrument", "A and B").with("visit", 1);
        assert!(f.matches(&id));
        assert!(!f.matches(&data_id(1, 1)));

        let f = Filter::parse(Some("instrument IN (\"X, Y\", HSC)"), &universe()).unwrap();
        assert!(f.matches(&DataId::new().with("instrument", "X, Y")));
        assert!(f.matches(&data_id(1, 1)));
        assert!(!f.matches(&DataId::new().with("instrument", "X")));
    }

    #[test]
    fn malformed_expressions_are_rejected() {
        for bad in ["visit ==", "visit IN ()", "tract = 3", "visit"] {
            match Filter::parse(Some(bad), &universe()) {
                Err(CatalogError::Expression { expression, .. }) => assert_eq!(expression, bad),
                other => panic!("expected Expression error for {bad:?}, got {other:?}"),
            }
        }
    }
}
