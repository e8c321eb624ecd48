// src/catalog/origin.rs

use std::collections::BTreeMap;

use crate::config::model::ConfigSection;

/// Names of the collections a build reads from and writes to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OriginInfo {
    inputs: Vec<String>,
    overrides: BTreeMap<String, Vec<String>>,
    output: String,
}

impl OriginInfo {
    pub fn new<I, S>(inputs: I, output: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            overrides: BTreeMap::new(),
            output: output.into(),
        }
    }

    pub fn from_config(cfg: &ConfigSection) -> Self {
        Self {
            inputs: cfg.input_collections.clone(),
            overrides: cfg.collections.clone(),
            output: cfg.output_collection.clone(),
        }
    }

    /// Use `collections` instead of the defaults for one dataset type.
    pub fn with_override<I, S>(mut self, dataset_type: &str, collections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.overrides.insert(
            dataset_type.to_string(),
            collections.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// Input collections for a dataset type, highest priority first.
    pub fn input_collections(&self, dataset_type: &str) -> &[String] {
        self.overrides
            .get(dataset_type)
            .map(|c| c.as_slice())
            .unwrap_or(&self.inputs)
    }

    pub fn output_collection(&self) -> &str {
        &self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_defaults() {
        let origin = OriginInfo::new(["raw", "calib"], "run")
            .with_override("bias", ["calib/2024"]);
        assert_eq!(origin.input_collections("raw"), ["raw", "calib"]);
        assert_eq!(origin.input_collections("bias"), ["calib/2024"]);
        assert_eq!(origin.output_collection(), "run");
    }
}
