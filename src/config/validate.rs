// src/config/validate.rs

use std::collections::{BTreeMap, HashSet};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{PipelineFile, RawPipelineFile};
use crate::errors::{GraphBuilderError, Result};

impl TryFrom<RawPipelineFile> for PipelineFile {
    type Error = GraphBuilderError;

    fn try_from(raw: RawPipelineFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_pipeline(&raw)?;
        Ok(PipelineFile::new_unchecked(raw.config, raw.task))
    }
}

fn validate_raw_pipeline(cfg: &RawPipelineFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    validate_global_config(cfg)?;
    validate_labels(cfg)?;
    validate_prerequisites(cfg)?;
    validate_dataflow(cfg)?;
    Ok(())
}

fn ensure_has_tasks(cfg: &RawPipelineFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(GraphBuilderError::ConfigError(
            "pipeline must contain at least one [[task]] entry".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawPipelineFile) -> Result<()> {
    if cfg.config.output_collection.trim().is_empty() {
        return Err(GraphBuilderError::ConfigError(
            "[config].output_collection must not be empty".to_string(),
        ));
    }

    if cfg.config.timeout_secs == 0 {
        return Err(GraphBuilderError::ConfigError(
            "[config].timeout_secs must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn validate_labels(cfg: &RawPipelineFile) -> Result<()> {
    let mut seen = HashSet::new();
    for task in cfg.task.iter() {
        if task.label.trim().is_empty() {
            return Err(GraphBuilderError::ConfigError(
                "every [[task]] needs a non-empty label".to_string(),
            ));
        }
        if !seen.insert(task.label.as_str()) {
            return Err(GraphBuilderError::ConfigError(format!(
                "duplicate task label '{}'",
                task.label
            )));
        }
    }
    Ok(())
}

fn validate_prerequisites(cfg: &RawPipelineFile) -> Result<()> {
    for task in cfg.task.iter() {
        for name in task.prerequisites.iter() {
            if !task.inputs.contains_key(name) {
                return Err(GraphBuilderError::UnknownConnection {
                    task: task.label.clone(),
                    connection: name.clone(),
                });
            }
        }
    }
    Ok(())
}

fn validate_dataflow(cfg: &RawPipelineFile) -> Result<()> {
    // Edge direction: producer -> consumer.
    // A task writing `calexp` and a later task reading it gives
    // isr -> calibrate.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
    let mut producers: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

    for task in cfg.task.iter() {
        graph.add_node(task.label.as_str());
        for dataset_type in task.produced_dataset_types() {
            producers
                .entry(dataset_type)
                .or_default()
                .push(task.label.as_str());
        }
    }

    for task in cfg.task.iter() {
        for dataset_type in task.consumed_dataset_types() {
            if let Some(producing) = producers.get(dataset_type) {
                for producer in producing {
                    graph.add_edge(*producer, task.label.as_str(), ());
                }
            }
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(GraphBuilderError::PipelineCycle(format!(
            "dataset flow between tasks forms a cycle involving task '{}'",
            cycle.node_id()
        ))),
    }
}
