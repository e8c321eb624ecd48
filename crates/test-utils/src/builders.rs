#![allow(dead_code)]

use std::collections::BTreeMap;

use qgraph::catalog::memory::StoredDataset;
use qgraph::catalog::{InMemoryCatalog, OriginInfo};
use qgraph::config::{ConfigSection, ConnectionConfig, PipelineFile, RawPipelineFile, TaskConfig};
use qgraph::dataset::DatasetId;
use qgraph::dimensions::{DataId, Dimension, DimensionUniverse};
use qgraph::pipeline::Pipeline;
use qgraph::types::ExistingOutputs;

/// Builder for validated pipelines to simplify test setup.
pub struct PipelineBuilder {
    raw: RawPipelineFile,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            raw: RawPipelineFile {
                config: ConfigSection::default(),
                task: Vec::new(),
            },
        }
    }

    pub fn with_task(mut self, task: TaskConfig) -> Self {
        self.raw.task.push(task);
        self
    }

    pub fn input_collections<I, S>(mut self, collections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.raw.config.input_collections = collections.into_iter().map(Into::into).collect();
        self
    }

    pub fn collection_override(mut self, dataset_type: &str, collections: &[&str]) -> Self {
        self.raw.config.collections.insert(
            dataset_type.to_string(),
            collections.iter().map(|c| c.to_string()).collect(),
        );
        self
    }

    pub fn output_collection(mut self, collection: &str) -> Self {
        self.raw.config.output_collection = collection.to_string();
        self
    }

    pub fn existing_outputs(mut self, policy: ExistingOutputs) -> Self {
        self.raw.config.existing_outputs = policy;
        self
    }

    pub fn build_file(self) -> PipelineFile {
        PipelineFile::try_from(self.raw).expect("Failed to build valid pipeline from builder")
    }

    /// Validated pipeline plus the collections from its `[config]`.
    pub fn build(self) -> (Pipeline, OriginInfo) {
        let file = self.build_file();
        (Pipeline::from_file(&file), OriginInfo::from_config(&file.config))
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskConfig`.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    pub fn new(label: &str) -> Self {
        Self {
            task: TaskConfig {
                label: label.to_string(),
                class: "DeclaredTask".to_string(),
                quantum_dimensions: vec![],
                per_dataset_type_dimensions: vec![],
                inputs: BTreeMap::new(),
                outputs: BTreeMap::new(),
                init_inputs: BTreeMap::new(),
                init_outputs: BTreeMap::new(),
                prerequisites: vec![],
            },
        }
    }

    pub fn class(mut self, class: &str) -> Self {
        self.task.class = class.to_string();
        self
    }

    pub fn quantum_dimensions(mut self, dims: &[&str]) -> Self {
        self.task.quantum_dimensions = dims.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn per_dataset_type_dimensions(mut self, dims: &[&str]) -> Self {
        self.task.per_dataset_type_dimensions = dims.iter().map(|d| d.to_string()).collect();
        self
    }

    /// Input connection named after its dataset type.
    pub fn input(mut self, dataset_type: &str, dims: &[&str]) -> Self {
        self.task.inputs.insert(
            dataset_type.to_string(),
            ConnectionConfig::new(dataset_type, dims.iter().copied()),
        );
        self
    }

    /// Input that must pre-exist.
    pub fn prerequisite(mut self, dataset_type: &str, dims: &[&str]) -> Self {
        self = self.input(dataset_type, dims);
        self.task.prerequisites.push(dataset_type.to_string());
        self
    }

    pub fn output(mut self, dataset_type: &str, dims: &[&str]) -> Self {
        self.task.outputs.insert(
            dataset_type.to_string(),
            ConnectionConfig::new(dataset_type, dims.iter().copied()),
        );
        self
    }

    pub fn init_input(mut self, dataset_type: &str) -> Self {
        self.task.init_inputs.insert(
            dataset_type.to_string(),
            ConnectionConfig::new(dataset_type, Vec::<String>::new()),
        );
        self
    }

    pub fn init_output(mut self, dataset_type: &str) -> Self {
        self.task.init_outputs.insert(
            dataset_type.to_string(),
            ConnectionConfig::new(dataset_type, Vec::<String>::new()),
        );
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}

/// Builder for an `InMemoryCatalog`.
pub struct CatalogBuilder {
    dimensions: Vec<Dimension>,
    data_ids: Vec<DataId>,
    datasets: Vec<StoredDataset>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self {
            dimensions: Vec::new(),
            data_ids: Vec::new(),
            datasets: Vec::new(),
        }
    }

    /// The usual `instrument` / `visit` / `detector` universe.
    pub fn observatory() -> Self {
        Self::new()
            .dimension("instrument", &[])
            .dimension("visit", &["instrument"])
            .dimension("detector", &["instrument"])
    }

    pub fn dimension(mut self, name: &str, requires: &[&str]) -> Self {
        self.dimensions
            .push(Dimension::new(name).requiring(requires.iter().copied()));
        self
    }

    pub fn data_id(mut self, data_id: DataId) -> Self {
        self.data_ids.push(data_id);
        self
    }

    pub fn dataset(mut self, collection: &str, dataset_type: &str, data_id: DataId, id: u64) -> Self {
        self.datasets.push(StoredDataset {
            collection: collection.to_string(),
            dataset_type: dataset_type.to_string(),
            data_id,
            id: DatasetId(id),
        });
        self
    }

    pub fn universe(&self) -> DimensionUniverse {
        DimensionUniverse::new(self.dimensions.clone()).expect("Invalid dimension universe in builder")
    }

    pub fn build(self) -> InMemoryCatalog {
        let mut catalog = InMemoryCatalog::new(self.universe());
        for data_id in self.data_ids {
            catalog.add_data_id(data_id);
        }
        for dataset in self.datasets {
            catalog.add_dataset(dataset);
        }
        catalog
    }
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}
