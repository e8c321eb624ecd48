// tests/error_handling.rs

use std::io::Write;

use qgraph::catalog::Catalog;
use qgraph::catalog::fixture::load_catalog;
use qgraph::config::load_and_validate;
use qgraph::errors::GraphBuilderError;
use qgraph::types::ExistingOutputs;
use tempfile::NamedTempFile;

#[test]
fn test_dataflow_cycle_returns_structured_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[[task]]
label = "A"
[task.inputs.x]
dataset_type = "X"
[task.outputs.y]
dataset_type = "Y"

[[task]]
label = "B"
[task.inputs.y]
dataset_type = "Y"
[task.outputs.x]
dataset_type = "X"
"#
    )
    .unwrap();

    let result = load_and_validate(file.path());

    match result {
        Err(GraphBuilderError::PipelineCycle(msg)) => {
            assert!(msg.contains("cycle"));
            assert!(msg.contains("A") || msg.contains("B"));
        }
        Err(e) => panic!("Expected PipelineCycle error, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_unknown_prerequisite_returns_structured_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[[task]]
label = "isr"
prerequisites = ["bias"]
[task.inputs.raw]
dataset_type = "raw"
"#
    )
    .unwrap();

    match load_and_validate(file.path()) {
        Err(GraphBuilderError::UnknownConnection { task, connection }) => {
            assert_eq!(task, "isr");
            assert_eq!(connection, "bias");
        }
        Err(e) => panic!("Expected UnknownConnection error, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_duplicate_label_returns_config_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[[task]]
label = "isr"

[[task]]
label = "isr"
"#
    )
    .unwrap();

    match load_and_validate(file.path()) {
        Err(GraphBuilderError::ConfigError(msg)) => assert!(msg.contains("duplicate task label")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_invalid_policy_is_a_toml_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[config]
existing_outputs = "overwrite"

[[task]]
label = "isr"
"#
    )
    .unwrap();

    assert!(matches!(
        load_and_validate(file.path()),
        Err(GraphBuilderError::TomlError(_))
    ));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_and_validate(dir.path().join("Pipeline.toml"));
    assert!(matches!(result, Err(GraphBuilderError::IoError(_))));
}

#[test]
fn test_valid_pipeline_keeps_order_and_config() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[config]
existing_outputs = "fail"
input_collections = ["raw/all", "calib"]
output_collection = "run/1"
timeout_secs = 30

[config.collections]
bias = ["calib/2024"]

[[task]]
label = "isr"
quantum_dimensions = ["visit", "detector"]
[task.inputs.raw]
dataset_type = "raw"
dimensions = ["instrument", "visit", "detector"]
[task.outputs.exposure]
dataset_type = "postISR"
dimensions = ["instrument", "visit", "detector"]

[[task]]
label = "calibrate"
quantum_dimensions = ["visit", "detector"]
[task.inputs.exposure]
dataset_type = "postISR"
dimensions = ["instrument", "visit", "detector"]
"#
    )
    .unwrap();

    let pipeline = load_and_validate(file.path()).unwrap();
    let labels: Vec<_> = pipeline.task.iter().map(|t| t.label.as_str()).collect();
    assert_eq!(labels, vec!["isr", "calibrate"]);
    assert_eq!(pipeline.config.existing_outputs, ExistingOutputs::Fail);
    assert_eq!(pipeline.config.timeout_secs, 30);
    assert!(pipeline.config.parallel);
    assert_eq!(pipeline.config.collections["bias"], vec!["calib/2024"]);
    assert_eq!(pipeline.task[1].class, "DeclaredTask");
}

#[test]
fn test_catalog_fixture_loads() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[dimensions.instrument]
[dimensions.visit]
requires = ["instrument"]

[[data_id]]
instrument = "HSC"
visit = 1

[[dataset]]
collection = "raw/all"
dataset_type = "raw"
id = 1
data_id = {{ instrument = "HSC", visit = 1 }}
"#
    )
    .unwrap();

    let catalog = load_catalog(file.path()).unwrap();
    assert!(catalog.universe().contains("visit"));
    assert_eq!(catalog.data_ids().len(), 1);
    assert_eq!(catalog.datasets().len(), 1);
}

#[test]
fn test_catalog_fixture_with_unknown_dimension() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[dimensions.instrument]

[[data_id]]
instrument = "HSC"
tract = 9813
"#
    )
    .unwrap();

    assert!(matches!(
        load_catalog(file.path()),
        Err(GraphBuilderError::ConfigError(_))
    ));
}
