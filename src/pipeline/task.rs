// src/pipeline/task.rs

//! Task implementations: what a task declares about its dataset types.

use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::config::model::{ConnectionConfig, TaskConfig};

/// Connection name -> dataset type declaration.
pub type Connections = BTreeMap<String, ConnectionConfig>;

/// A loaded task implementation.
///
/// Implementations only *declare* their I/O for a given configuration; the
/// builder never runs them.
pub trait PipelineTask: Send + Sync + Debug {
    fn input_connections(&self, config: &TaskConfig) -> Connections;

    fn output_connections(&self, config: &TaskConfig) -> Connections;

    fn init_input_connections(&self, _config: &TaskConfig) -> Connections {
        Connections::new()
    }

    fn init_output_connections(&self, _config: &TaskConfig) -> Connections {
        Connections::new()
    }

    /// Names of input connections that must already exist.
    fn prerequisite_inputs(&self, _config: &TaskConfig) -> Vec<String> {
        Vec::new()
    }

    /// Dimensions whose values may differ between this task's dataset types
    /// within one quantum.
    fn per_dataset_type_dimensions(&self, _config: &TaskConfig) -> Vec<String> {
        Vec::new()
    }
}

/// Task whose connections are declared entirely in its [`TaskConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclaredTask;

impl PipelineTask for DeclaredTask {
    fn input_connections(&self, config: &TaskConfig) -> Connections {
        config.inputs.clone()
    }

    fn output_connections(&self, config: &TaskConfig) -> Connections {
        config.outputs.clone()
    }

    fn init_input_connections(&self, config: &TaskConfig) -> Connections {
        config.init_inputs.clone()
    }

    fn init_output_connections(&self, config: &TaskConfig) -> Connections {
        config.init_outputs.clone()
    }

    fn prerequisite_inputs(&self, config: &TaskConfig) -> Vec<String> {
        config.prerequisites.clone()
    }

    fn per_dataset_type_dimensions(&self, config: &TaskConfig) -> Vec<String> {
        config.per_dataset_type_dimensions.clone()
    }
}
