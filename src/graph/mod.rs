// src/graph/mod.rs

//! Quantum graph construction.
//!
//! - [`extract`] reads one task's dataset type declarations.
//! - [`aggregate`] folds them into pipeline-wide categories.
//! - [`reconcile`] checks per-dataset-type dimension declarations.
//! - [`enumerate`] runs the catalog row query.
//! - [`assemble`] groups rows into quanta per task.
//! - [`builder`] drives the whole pass.

pub mod aggregate;
pub mod assemble;
pub mod builder;
pub mod enumerate;
pub mod events;
pub mod extract;
pub mod quantum;
pub mod reconcile;

pub use aggregate::PipelineDatasetTypes;
pub use builder::GraphBuilder;
pub use events::{BuildEvent, BuildObserver, NoopObserver};
pub use extract::TaskDatasetTypes;
pub use quantum::{Quantum, QuantumGraph, TaskNode};
