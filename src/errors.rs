// src/errors.rs

//! Crate-wide error type.
//!
//! Every variant means "the graph could not be built". There is no partial
//! graph on error; callers fix the pipeline or catalog state and build again.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::dataset::DatasetRef;
use crate::dimensions::DimensionSet;

#[derive(Error, Debug)]
pub enum GraphBuilderError {
    #[error("output datasets already exist for task {task}: {}", format_refs(.refs))]
    OutputExists { task: String, refs: Vec<DatasetRef> },

    #[error("prerequisite dataset missing: {0}")]
    PrerequisiteMissing(String),

    #[error(
        "task {task} uses dimensions {dimensions} without declaring them per-dataset-type, \
         but they are declared per-dataset-type by {}",
        .declared_by.join(", ")
    )]
    DimensionConflict {
        task: String,
        dimensions: DimensionSet,
        declared_by: Vec<String>,
    },

    #[error("could not find init-input {dataset_type} in any input collection")]
    InitInputNotFound { dataset_type: String },

    #[error("unknown dimension: {0}")]
    UnknownDimension(String),

    #[error("task {task} declares prerequisite '{connection}' which is not one of its inputs")]
    UnknownConnection { task: String, connection: String },

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("malformed catalog row: {0}")]
    MalformedRow(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("cycle detected in pipeline: {0}")]
    PipelineCycle(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Catalog failures other than lookup failures, passed through as-is.
    #[error(transparent)]
    Catalog(CatalogError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GraphBuilderError {
    pub fn is_output_exists(&self) -> bool {
        matches!(self, GraphBuilderError::OutputExists { .. })
    }

    pub fn is_prerequisite_missing(&self) -> bool {
        matches!(self, GraphBuilderError::PrerequisiteMissing(_))
    }
}

/// A catalog lookup failure means a prerequisite could not be resolved;
/// everything else keeps the catalog's own error.
impl From<CatalogError> for GraphBuilderError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Lookup(msg) => GraphBuilderError::PrerequisiteMissing(msg),
            other => GraphBuilderError::Catalog(other),
        }
    }
}

fn format_refs(refs: &[DatasetRef]) -> String {
    refs.iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, GraphBuilderError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{DatasetId, DatasetType};
    use crate::dimensions::DataId;

    #[test]
    fn lookup_failures_become_prerequisite_missing() {
        let err: GraphBuilderError = CatalogError::Lookup("bias not found".into()).into();
        assert!(err.is_prerequisite_missing());
        assert!(err.to_string().contains("bias not found"));
    }

    #[test]
    fn expression_errors_pass_through() {
        let err: GraphBuilderError = CatalogError::Expression {
            expression: "visit ==".into(),
            reason: "bad clause".into(),
        }
        .into();
        assert!(matches!(err, GraphBuilderError::Catalog(CatalogError::Expression { .. })));
    }

    #[test]
    fn output_exists_lists_refs() {
        let dt = DatasetType::new("B", DimensionSet::from_names(["visit"]));
        let r = DatasetRef::resolved(dt, DataId::new().with("visit", 1), DatasetId(3));
        let err = GraphBuilderError::OutputExists {
            task: "makeB".into(),
            refs: vec![r],
        };
        assert_eq!(
            err.to_string(),
            "output datasets already exist for task makeB: B@{visit: 1} (id=3)"
        );
    }
}
