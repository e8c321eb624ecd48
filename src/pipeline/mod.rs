// src/pipeline/mod.rs

//! Pipeline definitions.
//!
//! - [`TaskDef`] pairs a task's configuration with its (lazily resolved)
//!   implementation.
//! - [`task`] holds the [`PipelineTask`] trait and the config-driven
//!   [`DeclaredTask`].
//! - [`factory`] resolves task names to implementations.

pub mod factory;
pub mod task;

use std::fmt;
use std::sync::Arc;

use crate::config::model::{PipelineFile, TaskConfig};

pub use factory::{TaskFactory, TaskRegistry};
pub use task::{Connections, DeclaredTask, PipelineTask};

/// Canonical task label type.
pub type TaskLabel = String;

/// One task of a pipeline.
#[derive(Clone)]
pub struct TaskDef {
    pub label: TaskLabel,
    /// Implementation name; canonicalized on resolution.
    pub task_name: String,
    pub config: TaskConfig,
    /// `None` until resolved through a [`TaskFactory`].
    pub task_class: Option<Arc<dyn PipelineTask>>,
}

impl TaskDef {
    pub fn from_config(config: TaskConfig) -> Self {
        Self {
            label: config.label.clone(),
            task_name: config.class.clone(),
            config,
            task_class: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.task_class.is_some()
    }

    /// A copy of this definition bound to `task_class`, under its canonical
    /// name. `self` is left untouched.
    pub fn resolved(&self, task_class: Arc<dyn PipelineTask>, canonical_name: String) -> Self {
        Self {
            label: self.label.clone(),
            task_name: canonical_name,
            config: self.config.clone(),
            task_class: Some(task_class),
        }
    }
}

impl fmt::Debug for TaskDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskDef")
            .field("label", &self.label)
            .field("task_name", &self.task_name)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

/// An ordered sequence of task definitions.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    tasks: Vec<TaskDef>,
}

impl Pipeline {
    pub fn new(tasks: Vec<TaskDef>) -> Self {
        Self { tasks }
    }

    pub fn from_file(file: &PipelineFile) -> Self {
        Self::new(file.task.iter().cloned().map(TaskDef::from_config).collect())
    }

    pub fn tasks(&self) -> &[TaskDef] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskDef> {
        self.tasks.iter()
    }
}
