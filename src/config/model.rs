// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::types::ExistingOutputs;

/// Pipeline definition as read from a TOML file, before validation.
///
/// ```toml
/// [config]
/// input_collections = ["raw/all", "calib"]
/// output_collection = "run/1"
///
/// [[task]]
/// label = "isr"
/// quantum_dimensions = ["visit", "detector"]
///
/// [task.inputs.raw]
/// dataset_type = "raw"
/// dimensions = ["instrument", "visit", "detector"]
///
/// [task.outputs.exposure]
/// dataset_type = "postISR"
/// dimensions = ["instrument", "visit", "detector"]
/// ```
///
/// Tasks are an array of tables so that pipeline order is the file order.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPipelineFile {
    #[serde(default)]
    pub config: ConfigSection,

    #[serde(default)]
    pub task: Vec<TaskConfig>,
}

/// A validated pipeline definition.
///
/// Only obtainable through `TryFrom<RawPipelineFile>` (see `validate.rs`).
#[derive(Debug, Clone)]
pub struct PipelineFile {
    pub config: ConfigSection,
    pub task: Vec<TaskConfig>,
}

impl PipelineFile {
    pub(crate) fn new_unchecked(config: ConfigSection, task: Vec<TaskConfig>) -> Self {
        Self { config, task }
    }
}

/// `[config]` section: collections and build policy.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Behaviour when a quantum's outputs already exist.
    #[serde(default)]
    pub existing_outputs: ExistingOutputs,

    /// Input collections searched in priority order.
    #[serde(default)]
    pub input_collections: Vec<String>,

    /// Collection outputs are written to.
    #[serde(default = "default_output_collection")]
    pub output_collection: String,

    /// Per-dataset-type overrides of `input_collections`.
    #[serde(default)]
    pub collections: BTreeMap<String, Vec<String>>,

    /// Upper bound on the catalog query plus assembly, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Assemble quanta for different tasks concurrently.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

fn default_output_collection() -> String {
    "output".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_parallel() -> bool {
    true
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            existing_outputs: ExistingOutputs::default(),
            input_collections: Vec::new(),
            output_collection: default_output_collection(),
            collections: BTreeMap::new(),
            timeout_secs: default_timeout_secs(),
            parallel: default_parallel(),
        }
    }
}

/// One `[[task]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfig {
    /// Human-readable label, unique within the pipeline.
    pub label: String,

    /// Name of the task implementation, resolved through a task factory.
    #[serde(default = "default_task_class")]
    pub class: String,

    /// Dimensions defining the granularity of one quantum of this task.
    #[serde(default)]
    pub quantum_dimensions: Vec<String>,

    /// Dimensions whose values may differ between dataset types of the
    /// same quantum.
    #[serde(default)]
    pub per_dataset_type_dimensions: Vec<String>,

    #[serde(default)]
    pub inputs: BTreeMap<String, ConnectionConfig>,

    #[serde(default)]
    pub outputs: BTreeMap<String, ConnectionConfig>,

    #[serde(default)]
    pub init_inputs: BTreeMap<String, ConnectionConfig>,

    #[serde(default)]
    pub init_outputs: BTreeMap<String, ConnectionConfig>,

    /// Names of input connections that must pre-exist.
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

fn default_task_class() -> String {
    "DeclaredTask".to_string()
}

impl TaskConfig {
    /// Dataset type names this task reads, init-inputs included.
    pub fn consumed_dataset_types(&self) -> impl Iterator<Item = &str> {
        self.inputs
            .values()
            .chain(self.init_inputs.values())
            .map(|c| c.dataset_type.as_str())
    }

    /// Dataset type names this task writes, init-outputs included.
    pub fn produced_dataset_types(&self) -> impl Iterator<Item = &str> {
        self.outputs
            .values()
            .chain(self.init_outputs.values())
            .map(|c| c.dataset_type.as_str())
    }
}

/// A named connection: which dataset type, over which dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectionConfig {
    pub dataset_type: String,

    #[serde(default)]
    pub dimensions: Vec<String>,
}

impl ConnectionConfig {
    pub fn new<I, S>(dataset_type: &str, dimensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dataset_type: dataset_type.to_string(),
            dimensions: dimensions.into_iter().map(Into::into).collect(),
        }
    }
}
