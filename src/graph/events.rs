// src/graph/events.rs

//! Structured build events.
//!
//! The builder logs through `tracing` as well, but observers get typed
//! events at each decision point without parsing log lines.

use std::fmt::Debug;

use crate::dataset::DatasetRef;
use crate::dimensions::DimensionSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    /// A task definition was bound to its implementation.
    TaskResolved { label: String, task_name: String },
    /// The catalog query finished.
    RowsEnumerated { count: usize },
    /// Two tasks disagree about a dimension being per-dataset-type.
    DimensionConflict {
        task: String,
        dimensions: DimensionSet,
    },
    /// Every output of a prospective quantum already exists and the
    /// policy allows skipping it.
    QuantumSkipped {
        task: String,
        outputs: Vec<DatasetRef>,
    },
    QuantumCreated {
        task: String,
        inputs: usize,
        outputs: usize,
    },
    /// All quanta for one task have been built.
    TaskAssembled { task: String, quanta: usize },
}

/// Receives [`BuildEvent`]s.
///
/// Per-task assembly may run on several threads, so observers must be
/// `Sync`. Events from different tasks can interleave.
pub trait BuildObserver: Send + Sync + Debug {
    fn on_event(&self, event: &BuildEvent);
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl BuildObserver for NoopObserver {
    fn on_event(&self, _event: &BuildEvent) {}
}
