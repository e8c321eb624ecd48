// src/graph/extract.rs

//! Per-task dataset type extraction.

use std::collections::BTreeSet;

use tracing::debug;

use crate::dataset::DatasetType;
use crate::dimensions::{DimensionSet, DimensionUniverse};
use crate::errors::{GraphBuilderError, Result};
use crate::pipeline::{Connections, TaskDef};

/// Dataset types and dimensions declared by one resolved task.
///
/// Prerequisites are also present in `inputs`: they are read like any other
/// input, and listed separately so the catalog can treat their absence as
/// fatal.
#[derive(Debug, Clone)]
pub struct TaskDatasetTypes {
    pub task_def: TaskDef,
    pub inputs: BTreeSet<DatasetType>,
    pub outputs: BTreeSet<DatasetType>,
    pub init_inputs: BTreeSet<DatasetType>,
    pub init_outputs: BTreeSet<DatasetType>,
    pub per_dataset_type_dimensions: DimensionSet,
    pub prerequisites: BTreeSet<DatasetType>,
    /// Ordered link dimensions of the task's quantum dimensions.
    pub quantum_links: Vec<String>,
}

impl TaskDatasetTypes {
    /// Read the declarations of `task_def` and validate their dimensions
    /// against `universe`.
    pub fn extract(task_def: &TaskDef, universe: &DimensionUniverse) -> Result<Self> {
        let task_class = task_def.task_class.as_ref().ok_or_else(|| {
            GraphBuilderError::ConfigError(format!(
                "task '{}' must be resolved before extraction",
                task_def.label
            ))
        })?;
        let config = &task_def.config;

        let input_connections = task_class.input_connections(config);
        let inputs = dataset_types(&input_connections, universe)?;
        let outputs = dataset_types(&task_class.output_connections(config), universe)?;
        let init_inputs = dataset_types(&task_class.init_input_connections(config), universe)?;
        let init_outputs = dataset_types(&task_class.init_output_connections(config), universe)?;

        let mut prerequisites = BTreeSet::new();
        for name in task_class.prerequisite_inputs(config) {
            let connection = input_connections.get(&name).ok_or_else(|| {
                GraphBuilderError::UnknownConnection {
                    task: task_def.label.clone(),
                    connection: name.clone(),
                }
            })?;
            let dataset_type = inputs
                .get(connection.dataset_type.as_str())
                .cloned()
                .ok_or_else(|| GraphBuilderError::UnknownConnection {
                    task: task_def.label.clone(),
                    connection: name.clone(),
                })?;
            prerequisites.insert(dataset_type);
        }

        let per_dataset_type_dimensions =
            universe.dimension_set(task_class.per_dataset_type_dimensions(config))?;
        let quantum_links = universe.links_of_all(&config.quantum_dimensions)?;

        debug!(
            task = %task_def.label,
            inputs = inputs.len(),
            outputs = outputs.len(),
            prerequisites = prerequisites.len(),
            ?quantum_links,
            "extracted task dataset types"
        );

        Ok(Self {
            task_def: task_def.clone(),
            inputs,
            outputs,
            init_inputs,
            init_outputs,
            per_dataset_type_dimensions,
            prerequisites,
            quantum_links,
        })
    }

    pub fn label(&self) -> &str {
        &self.task_def.label
    }

    /// Union of the dimensions of all inputs and outputs.
    pub fn io_dimensions(&self) -> DimensionSet {
        DimensionSet::union_all(
            self.inputs
                .iter()
                .chain(self.outputs.iter())
                .map(|dt| dt.dimensions()),
        )
    }
}

/// Build dataset types from connections, first declaration of a name wins.
fn dataset_types(
    connections: &Connections,
    universe: &DimensionUniverse,
) -> Result<BTreeSet<DatasetType>> {
    let mut out = BTreeSet::new();
    for connection in connections.values() {
        let dimensions = universe.dimension_set(&connection.dimensions)?;
        out.insert(DatasetType::new(connection.dataset_type.clone(), dimensions));
    }
    Ok(out)
}
