// src/pipeline/factory.rs

//! Task-implementation resolution.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use tracing::debug;

use crate::errors::{GraphBuilderError, Result};
use crate::pipeline::task::{DeclaredTask, PipelineTask};

/// Loads task implementations by name.
///
/// Returns the implementation together with its canonical
/// (fully-qualified) name.
pub trait TaskFactory: Send + Sync + Debug {
    fn load_task_class(&self, name: &str) -> Result<(Arc<dyn PipelineTask>, String)>;
}

#[derive(Debug, Clone)]
struct Registered {
    canonical: String,
    task: Arc<dyn PipelineTask>,
}

/// Name/alias table of known task implementations.
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    entries: HashMap<String, Registered>,
}

impl TaskRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with [`DeclaredTask`] available as `DeclaredTask` and
    /// `qgraph.DeclaredTask`.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register("qgraph.DeclaredTask", ["DeclaredTask"], Arc::new(DeclaredTask));
        registry
    }

    /// Register `task` under `canonical` and any number of aliases.
    pub fn register<I, S>(&mut self, canonical: &str, aliases: I, task: Arc<dyn PipelineTask>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = Registered {
            canonical: canonical.to_string(),
            task,
        };
        for alias in aliases {
            self.entries.insert(alias.into(), entry.clone());
        }
        self.entries.insert(canonical.to_string(), entry);
    }
}

impl TaskFactory for TaskRegistry {
    fn load_task_class(&self, name: &str) -> Result<(Arc<dyn PipelineTask>, String)> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| GraphBuilderError::TaskNotFound(name.to_string()))?;
        debug!(task = %name, canonical = %entry.canonical, "loaded task class");
        Ok((Arc::clone(&entry.task), entry.canonical.clone()))
    }
}
