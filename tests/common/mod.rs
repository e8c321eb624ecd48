#![allow(dead_code)]

pub use qgraph_test_utils::builders;
pub use qgraph_test_utils::init_tracing;

use qgraph::dataset::{DatasetId, DatasetRef, DatasetType};
use qgraph::dimensions::{DataId, DimensionSet};

pub fn dataset_type(name: &str, dims: &[&str]) -> DatasetType {
    DatasetType::new(name, DimensionSet::from_names(dims.iter().copied()))
}

pub fn visit(instrument: &str, visit: i64) -> DataId {
    DataId::new().with("instrument", instrument).with("visit", visit)
}

pub fn exposure(instrument: &str, visit: i64, detector: i64) -> DataId {
    DataId::new()
        .with("instrument", instrument)
        .with("visit", visit)
        .with("detector", detector)
}

pub fn stored(dt: &DatasetType, data_id: DataId, id: u64) -> DatasetRef {
    DatasetRef::resolved(dt.clone(), data_id, DatasetId(id))
}

pub fn pending(dt: &DatasetType, data_id: DataId) -> DatasetRef {
    DatasetRef::new(dt.clone(), data_id)
}
