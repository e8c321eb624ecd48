// src/graph/quantum.rs

//! Output types of graph construction.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::dataset::{DatasetRef, DatasetType, DatasetTypeName};
use crate::pipeline::TaskDef;

/// One unit of execution: the datasets a task will read and write for one
/// combination of its quantum dimensions.
///
/// `run` and `task` are left unset at construction; the execution side
/// binds them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Quantum {
    pub run: Option<String>,
    pub task: Option<String>,
    predicted_inputs: BTreeMap<DatasetTypeName, Vec<DatasetRef>>,
    outputs: BTreeMap<DatasetTypeName, Vec<DatasetRef>>,
}

impl Quantum {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_predicted_input(&mut self, dataset_ref: DatasetRef) {
        self.predicted_inputs
            .entry(dataset_ref.dataset_type().name().to_string())
            .or_default()
            .push(dataset_ref);
    }

    pub fn add_output(&mut self, dataset_ref: DatasetRef) {
        self.outputs
            .entry(dataset_ref.dataset_type().name().to_string())
            .or_default()
            .push(dataset_ref);
    }

    pub fn predicted_inputs(&self) -> &BTreeMap<DatasetTypeName, Vec<DatasetRef>> {
        &self.predicted_inputs
    }

    pub fn outputs(&self) -> &BTreeMap<DatasetTypeName, Vec<DatasetRef>> {
        &self.outputs
    }

    /// All predicted inputs, grouped by dataset type name.
    pub fn input_refs(&self) -> impl Iterator<Item = &DatasetRef> {
        self.predicted_inputs.values().flatten()
    }

    /// All outputs, grouped by dataset type name.
    pub fn output_refs(&self) -> impl Iterator<Item = &DatasetRef> {
        self.outputs.values().flatten()
    }
}

/// A task together with the quanta it must execute.
#[derive(Debug, Clone)]
pub struct TaskNode {
    pub task_def: TaskDef,
    pub quanta: Vec<Quantum>,
}

impl TaskNode {
    pub fn label(&self) -> &str {
        &self.task_def.label
    }
}

/// The complete execution graph for a pipeline.
#[derive(Debug, Clone, Default)]
pub struct QuantumGraph {
    /// Dataset types the graph reads that no task produces.
    pub input_dataset_types: BTreeSet<DatasetType>,
    /// Dataset types produced by the graph.
    pub output_dataset_types: BTreeSet<DatasetType>,
    pub init_inputs: Vec<DatasetRef>,
    pub init_outputs: Vec<DatasetRef>,
    nodes: Vec<TaskNode>,
}

impl QuantumGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task node; nodes keep pipeline order.
    pub fn append(&mut self, node: TaskNode) {
        self.nodes.push(node);
    }

    pub fn nodes(&self) -> &[TaskNode] {
        &self.nodes
    }

    pub fn task_node(&self, label: &str) -> Option<&TaskNode> {
        self.nodes.iter().find(|n| n.label() == label)
    }

    /// Total number of quanta across all tasks.
    pub fn quanta_count(&self) -> usize {
        self.nodes.iter().map(|n| n.quanta.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.quanta_count() == 0
    }
}

/// Human-readable summary, used by the CLI.
impl fmt::Display for QuantumGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = |set: &BTreeSet<DatasetType>| {
            set.iter().map(|d| d.name()).collect::<Vec<_>>().join(", ")
        };

        writeln!(f, "quantum graph")?;
        writeln!(f, "  input dataset types: [{}]", names(&self.input_dataset_types))?;
        writeln!(f, "  output dataset types: [{}]", names(&self.output_dataset_types))?;
        for r in self.init_inputs.iter() {
            writeln!(f, "  init-input: {r}")?;
        }
        for r in self.init_outputs.iter() {
            writeln!(f, "  init-output: {r}")?;
        }
        writeln!(f)?;

        writeln!(f, "tasks ({}), quanta ({}):", self.nodes.len(), self.quanta_count())?;
        for node in self.nodes.iter() {
            writeln!(
                f,
                "  - {} ({}): {} quanta",
                node.label(),
                node.task_def.task_name,
                node.quanta.len()
            )?;
            for (i, q) in node.quanta.iter().enumerate() {
                let inputs: Vec<String> = q.input_refs().map(|r| r.to_string()).collect();
                let outputs: Vec<String> = q.output_refs().map(|r| r.to_string()).collect();
                writeln!(f, "      [{i}] in: {}", inputs.join(", "))?;
                writeln!(f, "          out: {}", outputs.join(", "))?;
            }
        }
        Ok(())
    }
}
