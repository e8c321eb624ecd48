// tests/demo_pipeline.rs

mod common;
use crate::common::init_tracing;

use std::path::PathBuf;

use qgraph::catalog::OriginInfo;
use qgraph::catalog::fixture::load_catalog;
use qgraph::config::load_and_validate;
use qgraph::graph::GraphBuilder;
use qgraph::pipeline::{Pipeline, TaskRegistry};

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos").join(name)
}

#[test]
fn demo_pipeline_builds() {
    init_tracing();
    let file = load_and_validate(demo("Pipeline.toml")).unwrap();
    let catalog = load_catalog(demo("catalog.toml")).unwrap();

    let graph = GraphBuilder::new(TaskRegistry::with_builtin(), catalog)
        .existing_outputs(file.config.existing_outputs)
        .make_graph(&Pipeline::from_file(&file), &OriginInfo::from_config(&file.config), None)
        .unwrap();

    assert_eq!(graph.task_node("isr").unwrap().quanta.len(), 3);
    let summary = graph.task_node("visitSummary").unwrap();
    assert_eq!(summary.quanta.len(), 2);
    assert_eq!(summary.quanta[0].predicted_inputs()["postISR"].len(), 2);
    assert_eq!(graph.init_outputs.len(), 1);
    assert_eq!(graph.init_outputs[0].dataset_type().name(), "isr_schema");

    let text = graph.to_string();
    assert!(text.contains("isr (qgraph.DeclaredTask): 3 quanta"));
}

#[test]
fn demo_query_restricts_to_one_visit() {
    init_tracing();
    let file = load_and_validate(demo("Pipeline.toml")).unwrap();
    let catalog = load_catalog(demo("catalog.toml")).unwrap();

    let graph = GraphBuilder::new(TaskRegistry::with_builtin(), catalog)
        .make_graph(
            &Pipeline::from_file(&file),
            &OriginInfo::from_config(&file.config),
            Some("visit = 2"),
        )
        .unwrap();

    assert_eq!(graph.task_node("isr").unwrap().quanta.len(), 1);
    assert_eq!(graph.task_node("visitSummary").unwrap().quanta.len(), 1);
}
