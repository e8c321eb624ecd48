// src/catalog/fixture.rs

//! TOML fixtures for [`InMemoryCatalog`].
//!
//! ```toml
//! [dimensions.instrument]
//!
//! [dimensions.visit]
//! requires = ["instrument"]
//!
//! [[data_id]]
//! instrument = "HSC"
//! visit = 1
//!
//! [[dataset]]
//! collection = "raw/all"
//! dataset_type = "raw"
//! id = 1
//! data_id = { instrument = "HSC", visit = 1 }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::memory::{InMemoryCatalog, StoredDataset};
use crate::dataset::DatasetId;
use crate::dimensions::{DataId, Dimension, DimensionUniverse};
use crate::errors::{GraphBuilderError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogFixture {
    #[serde(default)]
    pub dimensions: BTreeMap<String, DimensionSpec>,

    #[serde(default, rename = "data_id")]
    pub data_ids: Vec<DataId>,

    #[serde(default, rename = "dataset")]
    pub datasets: Vec<DatasetSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DimensionSpec {
    #[serde(default)]
    pub requires: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetSpec {
    pub collection: String,
    pub dataset_type: String,
    pub id: DatasetId,
    #[serde(default)]
    pub data_id: DataId,
}

impl TryFrom<CatalogFixture> for InMemoryCatalog {
    type Error = GraphBuilderError;

    fn try_from(fixture: CatalogFixture) -> std::result::Result<Self, Self::Error> {
        let universe = DimensionUniverse::new(
            fixture
                .dimensions
                .into_iter()
                .map(|(name, spec)| Dimension::new(name).requiring(spec.requires)),
        )?;

        for data_id in fixture.data_ids.iter() {
            ensure_known_dimensions(&universe, data_id, "data_id")?;
        }
        for spec in fixture.datasets.iter() {
            ensure_known_dimensions(&universe, &spec.data_id, &spec.dataset_type)?;
        }

        let mut catalog = InMemoryCatalog::new(universe);
        for data_id in fixture.data_ids {
            catalog.add_data_id(data_id);
        }
        for spec in fixture.datasets {
            catalog.add_dataset(StoredDataset {
                collection: spec.collection,
                dataset_type: spec.dataset_type,
                data_id: spec.data_id,
                id: spec.id,
            });
        }
        Ok(catalog)
    }
}

fn ensure_known_dimensions(universe: &DimensionUniverse, data_id: &DataId, what: &str) -> Result<()> {
    for (dim, _) in data_id.iter() {
        if !universe.contains(dim) {
            return Err(GraphBuilderError::ConfigError(format!(
                "catalog fixture: {what} uses unknown dimension '{dim}'"
            )));
        }
    }
    Ok(())
}

/// Read a catalog fixture from disk.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<InMemoryCatalog> {
    let contents = fs::read_to_string(path.as_ref())?;
    let fixture: CatalogFixture = toml::from_str(&contents)?;
    InMemoryCatalog::try_from(fixture)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    const FIXTURE: &str = r#"
[dimensions.instrument]

[dimensions.visit]
requires = ["instrument"]

[[data_id]]
instrument = "HSC"
visit = 1

[[data_id]]
instrument = "HSC"
visit = 2

[[dataset]]
collection = "raw"
dataset_type = "raw"
id = 7
data_id = { instrument = "HSC", visit = 1 }
"#;

    #[test]
    fn parses_fixture() {
        let fixture: CatalogFixture = toml::from_str(FIXTURE).unwrap();
        let catalog = InMemoryCatalog::try_from(fixture).unwrap();

        assert_eq!(catalog.data_ids().len(), 2);
        assert_eq!(catalog.datasets().len(), 1);
        assert_eq!(catalog.datasets()[0].id, DatasetId(7));
        assert_eq!(
            catalog.universe().links("visit").unwrap(),
            vec!["instrument", "visit"]
        );
    }

    #[test]
    fn rejects_unknown_dimensions() {
        let src = "[dimensions.instrument]\n\n[[data_id]]\ninstrument = \"HSC\"\ntract = 3\n";
        let fixture: CatalogFixture = toml::from_str(src).unwrap();
        match InMemoryCatalog::try_from(fixture) {
            Err(GraphBuilderError::ConfigError(msg)) => assert!(msg.contains("tract")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }
}
