// src/lib.rs

pub mod catalog;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod dimensions;
pub mod errors;
pub mod graph;
pub mod logging;
pub mod pipeline;
pub mod types;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, info};

use crate::catalog::OriginInfo;
use crate::catalog::fixture::load_catalog;
use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::PipelineFile;
use crate::graph::GraphBuilder;
use crate::pipeline::{Pipeline, TaskRegistry};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - pipeline loading and validation
/// - the catalog fixture
/// - the graph builder, on a blocking thread under the configured timeout
pub async fn run(args: CliArgs) -> Result<()> {
    let pipeline_path = PathBuf::from(&args.pipeline);
    let file = load_and_validate(&pipeline_path)
        .with_context(|| format!("loading pipeline {}", pipeline_path.display()))?;

    if args.dry_run {
        print_dry_run(&file);
        return Ok(());
    }

    let catalog_path = args
        .catalog
        .as_deref()
        .ok_or_else(|| anyhow!("--catalog is required unless --dry-run is given"))?;
    let catalog = load_catalog(catalog_path)
        .with_context(|| format!("loading catalog {catalog_path}"))?;

    let policy = args
        .existing_outputs()
        .unwrap_or(file.config.existing_outputs);
    let parallel = file.config.parallel && !args.serial;
    let timeout = Duration::from_secs(file.config.timeout_secs);
    let origin = OriginInfo::from_config(&file.config);
    let pipeline = Pipeline::from_file(&file);
    let query = args.query.clone();

    info!(
        tasks = pipeline.len(),
        ?policy,
        parallel,
        timeout_secs = timeout.as_secs(),
        "building quantum graph"
    );

    let builder = GraphBuilder::new(TaskRegistry::with_builtin(), catalog)
        .existing_outputs(policy)
        .parallel(parallel);

    // The catalog query may block; keep it off the async workers.
    let handle = tokio::task::spawn_blocking(move || {
        builder.make_graph(&pipeline, &origin, query.as_deref())
    });
    let graph = match tokio::time::timeout(timeout, handle).await {
        Ok(joined) => joined.context("graph build panicked")??,
        Err(_) => bail!("graph build timed out after {}s", timeout.as_secs()),
    };

    print!("{graph}");
    Ok(())
}

/// Simple dry-run output: print collections and task declarations.
fn print_dry_run(file: &PipelineFile) {
    let cfg = &file.config;
    println!("qgraph dry-run");
    println!("  config.existing_outputs = {:?}", cfg.existing_outputs);
    println!("  config.input_collections = {:?}", cfg.input_collections);
    println!("  config.output_collection = {}", cfg.output_collection);
    for (dataset_type, collections) in cfg.collections.iter() {
        println!("  config.collections.{dataset_type} = {collections:?}");
    }
    println!();

    println!("tasks ({}):", file.task.len());
    for task in file.task.iter() {
        println!("  - {} ({})", task.label, task.class);
        if !task.quantum_dimensions.is_empty() {
            println!("      quantum dimensions: {:?}", task.quantum_dimensions);
        }
        for (name, c) in task.inputs.iter() {
            println!("      input {name}: {} {:?}", c.dataset_type, c.dimensions);
        }
        for (name, c) in task.outputs.iter() {
            println!("      output {name}: {} {:?}", c.dataset_type, c.dimensions);
        }
        for (name, c) in task.init_inputs.iter() {
            println!("      init-input {name}: {}", c.dataset_type);
        }
        for (name, c) in task.init_outputs.iter() {
            println!("      init-output {name}: {}", c.dataset_type);
        }
        if !task.prerequisites.is_empty() {
            println!("      prerequisites: {:?}", task.prerequisites);
        }
        if !task.per_dataset_type_dimensions.is_empty() {
            println!(
                "      per-dataset-type dimensions: {:?}",
                task.per_dataset_type_dimensions
            );
        }
    }

    debug!("dry-run complete (no catalog query)");
}
