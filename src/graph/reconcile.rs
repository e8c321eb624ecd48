// src/graph/reconcile.rs

//! Pipeline-wide per-dataset-type dimensions.

use tracing::{debug, warn};

use crate::dimensions::DimensionSet;
use crate::errors::{GraphBuilderError, Result};
use crate::graph::extract::TaskDatasetTypes;

/// Union of every task's per-dataset-type dimensions.
///
/// Fails if some task uses one of those dimensions as a common dimension,
/// i.e. through its inputs or outputs without declaring it per-dataset-type
/// itself.
pub fn reconcile_per_dataset_type_dimensions(tasks: &[TaskDatasetTypes]) -> Result<DimensionSet> {
    let per_dataset_type =
        DimensionSet::union_all(tasks.iter().map(|t| &t.per_dataset_type_dimensions));

    for task in tasks {
        let common = task.io_dimensions().difference(&task.per_dataset_type_dimensions);
        if common.is_disjoint(&per_dataset_type) {
            continue;
        }

        let overlap = common.intersection(&per_dataset_type);
        let declared_by: Vec<String> = tasks
            .iter()
            .filter(|t| !t.per_dataset_type_dimensions.is_disjoint(&overlap))
            .map(|t| t.label().to_string())
            .collect();
        warn!(
            task = %task.label(),
            dimensions = %overlap,
            ?declared_by,
            "per-dataset-type dimension conflict"
        );
        return Err(GraphBuilderError::DimensionConflict {
            task: task.label().to_string(),
            dimensions: overlap,
            declared_by,
        });
    }

    debug!(dimensions = %per_dataset_type, "per-dataset-type dimensions");
    Ok(per_dataset_type)
}
