// src/graph/aggregate.rs

//! Pipeline-wide categorization of dataset types.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::dataset::DatasetType;
use crate::graph::extract::TaskDatasetTypes;

/// Dataset types of a whole pipeline, by role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineDatasetTypes {
    /// Must exist in the input collections to build a consuming quantum.
    pub required: BTreeSet<DatasetType>,
    /// Produced by the pipeline; may pre-exist, subject to the
    /// existing-outputs policy.
    pub optional: BTreeSet<DatasetType>,
    /// Must exist; absence is fatal wherever they are needed.
    pub prerequisite: BTreeSet<DatasetType>,
    pub init_inputs: BTreeSet<DatasetType>,
    pub init_outputs: BTreeSet<DatasetType>,
}

impl PipelineDatasetTypes {
    /// Fold per-task declarations into pipeline-wide sets.
    ///
    /// The first declaration of a name is the canonical dataset type. Then
    /// produced types are removed from `required` and `prerequisite`, and
    /// init-outputs from `init_inputs`.
    pub fn from_tasks(tasks: &[TaskDatasetTypes]) -> Self {
        let mut canonical: BTreeMap<String, DatasetType> = BTreeMap::new();
        let mut required = BTreeSet::new();
        let mut optional = BTreeSet::new();
        let mut prerequisite = BTreeSet::new();
        let mut init_inputs = BTreeSet::new();
        let mut init_outputs = BTreeSet::new();

        for task in tasks {
            collect_names(&mut required, &task.inputs, &mut canonical);
            collect_names(&mut optional, &task.outputs, &mut canonical);
            collect_names(&mut prerequisite, &task.prerequisites, &mut canonical);
            collect_names(&mut init_inputs, &task.init_inputs, &mut canonical);
            collect_names(&mut init_outputs, &task.init_outputs, &mut canonical);
        }

        // Anything the pipeline produces can't be required or prerequisite.
        let required: BTreeSet<String> = required.difference(&optional).cloned().collect();
        let prerequisite: BTreeSet<String> = prerequisite.difference(&optional).cloned().collect();
        let init_inputs: BTreeSet<String> = init_inputs.difference(&init_outputs).cloned().collect();

        let resolve = |names: &BTreeSet<String>| -> BTreeSet<DatasetType> {
            names.iter().filter_map(|n| canonical.get(n).cloned()).collect()
        };

        let out = Self {
            required: resolve(&required),
            optional: resolve(&optional),
            prerequisite: resolve(&prerequisite),
            init_inputs: resolve(&init_inputs),
            init_outputs: resolve(&init_outputs),
        };

        debug!(
            required = out.required.len(),
            optional = out.optional.len(),
            prerequisite = out.prerequisite.len(),
            init_inputs = out.init_inputs.len(),
            init_outputs = out.init_outputs.len(),
            "categorized pipeline dataset types"
        );
        out
    }

    /// Dataset types the graph reads from outside: required and
    /// prerequisite.
    pub fn inputs(&self) -> BTreeSet<DatasetType> {
        self.required.union(&self.prerequisite).cloned().collect()
    }
}

fn collect_names(
    names: &mut BTreeSet<String>,
    types: &BTreeSet<DatasetType>,
    canonical: &mut BTreeMap<String, DatasetType>,
) {
    for dt in types {
        names.insert(dt.name().to_string());
        canonical
            .entry(dt.name().to_string())
            .or_insert_with(|| dt.clone());
    }
}
