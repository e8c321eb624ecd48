// src/graph/builder.rs

//! End-to-end graph construction.
//!
//! The flow is a single forward pass:
//!
//! 1. resolve each task definition through the [`TaskFactory`];
//! 2. extract per-task dataset types and fold them pipeline-wide;
//! 3. reconcile per-dataset-type dimensions;
//! 4. run the catalog row query once and materialize the rows;
//! 5. resolve init-inputs;
//! 6. assemble one [`TaskNode`] per task (optionally in parallel) and
//!    synthesize init-outputs.
//!
//! Any error aborts the build; no partial graph is returned.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, info_span, warn};

use crate::catalog::{Catalog, OriginInfo, Row, RowQuery};
use crate::dataset::{DatasetRef, DatasetType};
use crate::errors::{GraphBuilderError, Result};
use crate::graph::aggregate::PipelineDatasetTypes;
use crate::graph::assemble::assemble_task;
use crate::graph::enumerate::enumerate_rows;
use crate::graph::events::{BuildEvent, BuildObserver, NoopObserver};
use crate::graph::extract::TaskDatasetTypes;
use crate::graph::reconcile::reconcile_per_dataset_type_dimensions;
use crate::graph::quantum::{QuantumGraph, TaskNode};
use crate::pipeline::{Pipeline, TaskDef, TaskFactory};
use crate::types::ExistingOutputs;

/// Builds [`QuantumGraph`]s from pipelines against one catalog.
#[derive(Debug)]
pub struct GraphBuilder<F, C> {
    factory: F,
    catalog: C,
    existing_outputs: ExistingOutputs,
    parallel: bool,
    observer: Arc<dyn BuildObserver>,
}

impl<F: TaskFactory, C: Catalog> GraphBuilder<F, C> {
    /// Builder with the default policy (skip fully existing outputs) and
    /// parallel assembly.
    pub fn new(factory: F, catalog: C) -> Self {
        Self {
            factory,
            catalog,
            existing_outputs: ExistingOutputs::default(),
            parallel: true,
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn existing_outputs(mut self, policy: ExistingOutputs) -> Self {
        self.existing_outputs = policy;
        self
    }

    /// Shorthand for [`ExistingOutputs::from_skip_existing`].
    pub fn skip_existing(self, skip: bool) -> Self {
        self.existing_outputs(ExistingOutputs::from_skip_existing(skip))
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn observer(mut self, observer: Arc<dyn BuildObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Bind `task_def` to its implementation.
    ///
    /// Returns a new definition; already resolved definitions come back
    /// unchanged and the factory is not consulted.
    pub fn resolve_task(&self, task_def: &TaskDef) -> Result<TaskDef> {
        if task_def.is_resolved() {
            return Ok(task_def.clone());
        }
        let (task_class, canonical) = self.factory.load_task_class(&task_def.task_name)?;
        debug!(label = %task_def.label, task = %canonical, "resolved task");
        self.observer.on_event(&BuildEvent::TaskResolved {
            label: task_def.label.clone(),
            task_name: canonical.clone(),
        });
        Ok(task_def.resolved(task_class, canonical))
    }

    /// Build the execution graph for `pipeline`.
    ///
    /// `expression` is passed to the catalog as-is.
    pub fn make_graph(
        &self,
        pipeline: &Pipeline,
        origin: &OriginInfo,
        expression: Option<&str>,
    ) -> Result<QuantumGraph> {
        let span = info_span!("make_graph", tasks = pipeline.len());
        let _guard = span.enter();

        let universe = self.catalog.universe();
        let mut tasks = Vec::with_capacity(pipeline.len());
        for task_def in pipeline.iter() {
            let resolved = self.resolve_task(task_def)?;
            tasks.push(TaskDatasetTypes::extract(&resolved, universe)?);
        }

        let io = PipelineDatasetTypes::from_tasks(&tasks);
        let per_dataset_type_dimensions =
            reconcile_per_dataset_type_dimensions(&tasks).inspect_err(|err| {
                if let GraphBuilderError::DimensionConflict {
                    task, dimensions, ..
                } = err
                {
                    self.observer.on_event(&BuildEvent::DimensionConflict {
                        task: task.clone(),
                        dimensions: dimensions.clone(),
                    });
                }
            })?;

        let query = RowQuery {
            required: &io.required,
            optional: &io.optional,
            prerequisite: &io.prerequisite,
            per_dataset_type_dimensions: &per_dataset_type_dimensions,
            expression,
            origin,
        };
        let rows = enumerate_rows(&self.catalog, &query)?;
        self.observer
            .on_event(&BuildEvent::RowsEnumerated { count: rows.len() });

        let init_inputs = self.resolve_init_inputs(&io, origin)?;
        let nodes = self.assemble_all(&tasks, &rows)?;

        let mut graph = QuantumGraph::new();
        graph.input_dataset_types = io.inputs();
        graph.output_dataset_types = io.optional.clone();
        graph.init_inputs = init_inputs;
        graph.init_outputs = io
            .init_outputs
            .iter()
            .cloned()
            .map(DatasetRef::unbound)
            .collect();
        for node in nodes {
            graph.append(node);
        }

        info!(
            tasks = graph.nodes().len(),
            quanta = graph.quanta_count(),
            "quantum graph built"
        );
        Ok(graph)
    }

    /// One node per task, in pipeline order. With several failing tasks the
    /// error of the earliest one is returned, whether or not assembly ran in
    /// parallel.
    fn assemble_all(
        &self,
        tasks: &[TaskDatasetTypes],
        rows: &[Row],
    ) -> Result<Vec<TaskNode>> {
        let policy = self.existing_outputs;
        let observer: &dyn BuildObserver = self.observer.as_ref();

        if !self.parallel {
            return tasks
                .iter()
                .map(|task| assemble_task(task, rows, policy, observer))
                .collect();
        }

        let results: Vec<Result<TaskNode>> = tasks
            .par_iter()
            .map(|task| assemble_task(task, rows, policy, observer))
            .collect();
        results.into_iter().collect()
    }

    /// First hit for each init-input across its input collections, in
    /// dataset type name order.
    fn resolve_init_inputs(
        &self,
        io: &PipelineDatasetTypes,
        origin: &OriginInfo,
    ) -> Result<Vec<DatasetRef>> {
        let mut refs = Vec::with_capacity(io.init_inputs.len());
        for dataset_type in io.init_inputs.iter() {
            refs.push(self.find_init_input(dataset_type, origin)?);
        }
        Ok(refs)
    }

    fn find_init_input(&self, dataset_type: &DatasetType, origin: &OriginInfo) -> Result<DatasetRef> {
        let collections = origin.input_collections(dataset_type.name());
        for collection in collections {
            if let Some(found) = self.catalog.find(collection, dataset_type)? {
                debug!(dataset_type = dataset_type.name(), %collection, "found init-input");
                return Ok(found);
            }
        }
        warn!(
            dataset_type = dataset_type.name(),
            collections = ?collections,
            "init-input not found"
        );
        Err(GraphBuilderError::InitInputNotFound {
            dataset_type: dataset_type.name().to_string(),
        })
    }
}
