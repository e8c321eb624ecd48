// src/catalog/memory.rs

use std::collections::BTreeSet;

use tracing::{debug, trace};

use super::expression::Filter;
use super::{Catalog, CatalogError, OriginInfo, Row, RowIter, RowQuery};
use crate::dataset::{DatasetId, DatasetRef, DatasetType};
use crate::dimensions::{DataId, DimensionSet, DimensionUniverse};

/// A dataset stored in an [`InMemoryCatalog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDataset {
    pub collection: String,
    pub dataset_type: String,
    pub data_id: DataId,
    pub id: DatasetId,
}

/// Catalog backed by plain vectors.
///
/// - `data_ids` are the candidate dimension combinations (one per
///   potential row), e.g. every (instrument, visit, detector) observed.
/// - `datasets` are the stored datasets, keyed by collection and type.
///
/// Row enumeration walks `data_ids` in insertion order, so results are
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    universe: DimensionUniverse,
    data_ids: Vec<DataId>,
    datasets: Vec<StoredDataset>,
}

/// Owned copy of a [`RowQuery`], moved into the lazy row iterator.
#[derive(Debug, Clone)]
struct QueryPlan {
    inputs: Vec<DatasetType>,
    prerequisite: BTreeSet<DatasetType>,
    outputs: Vec<DatasetType>,
    per_dataset_type_dimensions: DimensionSet,
    origin: OriginInfo,
}

impl InMemoryCatalog {
    pub fn new(universe: DimensionUniverse) -> Self {
        Self {
            universe,
            data_ids: Vec::new(),
            datasets: Vec::new(),
        }
    }

    pub fn add_data_id(&mut self, data_id: DataId) {
        self.data_ids.push(data_id);
    }

    pub fn add_dataset(&mut self, dataset: StoredDataset) {
        self.datasets.push(dataset);
    }

    pub fn data_ids(&self) -> &[DataId] {
        &self.data_ids
    }

    pub fn datasets(&self) -> &[StoredDataset] {
        &self.datasets
    }

    /// Stored datasets of `dataset_type` whose coordinates agree with `key`,
    /// taken from the first collection (in priority order) that has any.
    fn matching(
        &self,
        collections: &[String],
        dataset_type: &DatasetType,
        key: &DataId,
    ) -> Vec<DatasetRef> {
        for collection in collections {
            let hits: Vec<DatasetRef> = self
                .datasets
                .iter()
                .filter(|s| {
                    s.collection == *collection
                        && s.dataset_type == dataset_type.name()
                        && s.data_id.is_superset_of(key)
                })
                .map(|s| DatasetRef::resolved(dataset_type.clone(), s.data_id.clone(), s.id))
                .collect();
            if !hits.is_empty() {
                return hits;
            }
        }
        Vec::new()
    }

    /// Input datasets of `dt` for candidate `base`, plus the key they were
    /// matched on.
    fn find_input(&self, base: &DataId, dt: &DatasetType, plan: &QueryPlan) -> (Vec<DatasetRef>, DataId) {
        let common = dt.dimensions().difference(&plan.per_dataset_type_dimensions);
        let key = base.restrict(&common);
        let found = if key.len() == common.len() {
            self.matching(plan.origin.input_collections(dt.name()), dt, &key)
        } else {
            Vec::new()
        };
        (found, key)
    }

    /// Expand one candidate data ID into zero or more rows.
    ///
    /// Dataset types with per-dataset-type dimensions can match several
    /// stored datasets for the same candidate; every combination becomes a
    /// row.
    fn expand(&self, base: &DataId, plan: &QueryPlan) -> Vec<Result<Row, CatalogError>> {
        let mut choices: Vec<Vec<DatasetRef>> = Vec::new();

        // Prerequisites are checked only for candidates with every required input.
        let (prerequisites, required): (Vec<&DatasetType>, Vec<&DatasetType>) = plan
            .inputs
            .iter()
            .partition(|dt| plan.prerequisite.contains(*dt));

        for dt in required {
            let (found, _) = self.find_input(base, dt, plan);
            if found.is_empty() {
                trace!(data_id = %base, dataset_type = dt.name(), "required input missing; dropping candidate");
                return Vec::new();
            }
            choices.push(found);
        }

        for dt in prerequisites {
            let (found, key) = self.find_input(base, dt, plan);
            if found.is_empty() {
                return vec![Err(CatalogError::Lookup(format!(
                    "prerequisite dataset {} not found for {} in collections [{}]",
                    dt.name(),
                    key,
                    plan.origin.input_collections(dt.name()).join(", ")
                )))];
            }
            choices.push(found);
        }

        let output_collection = [plan.origin.output_collection().to_string()];
        for dt in plan.outputs.iter() {
            let common = dt.dimensions().difference(&plan.per_dataset_type_dimensions);
            let key = base.restrict(&common);
            let mut found = self.matching(&output_collection, dt, &key);
            if found.is_empty() {
                found.push(DatasetRef::new(dt.clone(), base.restrict(dt.dimensions())));
            }
            choices.push(found);
        }

        let mut rows = vec![Row::new(base.clone())];
        for options in choices {
            let mut next = Vec::with_capacity(rows.len() * options.len());
            for row in rows.iter() {
                for r in options.iter() {
                    next.push(row.clone().with_ref(r.clone()));
                }
            }
            rows = next;
        }
        rows.into_iter().map(Ok).collect()
    }
}

impl Catalog for InMemoryCatalog {
    fn universe(&self) -> &DimensionUniverse {
        &self.universe
    }

    fn select_rows(&self, query: &RowQuery<'_>) -> Result<RowIter<'_>, CatalogError> {
        let filter = Filter::parse(query.expression, &self.universe)?;

        let inputs: BTreeSet<DatasetType> = query
            .required
            .iter()
            .chain(query.prerequisite.iter())
            .cloned()
            .collect();
        let plan = QueryPlan {
            inputs: inputs.into_iter().collect(),
            prerequisite: query.prerequisite.clone(),
            outputs: query.optional.iter().cloned().collect(),
            per_dataset_type_dimensions: query.per_dataset_type_dimensions.clone(),
            origin: query.origin.clone(),
        };
        debug!(
            candidates = self.data_ids.len(),
            inputs = plan.inputs.len(),
            outputs = plan.outputs.len(),
            "in-memory catalog: selecting rows"
        );

        Ok(Box::new(
            self.data_ids
                .iter()
                .filter(move |d| filter.matches(d))
                .flat_map(move |base| self.expand(base, &plan)),
        ))
    }

    fn find(
        &self,
        collection: &str,
        dataset_type: &DatasetType,
    ) -> Result<Option<DatasetRef>, CatalogError> {
        Ok(self
            .datasets
            .iter()
            .find(|s| s.collection == collection && s.dataset_type == dataset_type.name())
            .map(|s| DatasetRef::resolved(dataset_type.clone(), s.data_id.clone(), s.id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimensions::Dimension;

    fn universe() -> DimensionUniverse {
        DimensionUniverse::new([
            Dimension::new("instrument"),
            Dimension::new("visit").requiring(["instrument"]),
            Dimension::new("detector").requiring(["instrument"]),
        ])
        .unwrap()
    }

    fn dims(names: &[&str]) -> DimensionSet {
        DimensionSet::from_names(names.iter().copied())
    }

    fn catalog() -> InMemoryCatalog {
        let mut c = InMemoryCatalog::new(universe());
        for visit in [1, 2] {
            c.add_data_id(DataId::new().with("instrument", "HSC").with("visit", visit));
        }
        c.add_dataset(StoredDataset {
            collection: "raw".into(),
            dataset_type: "raw".into(),
            data_id: DataId::new().with("instrument", "HSC").with("visit", 1),
            id: DatasetId(1),
        });
        c.add_dataset(StoredDataset {
            collection: "run".into(),
            dataset_type: "calexp".into(),
            data_id: DataId::new().with("instrument", "HSC").with("visit", 1),
            id: DatasetId(2),
        });
        c
    }

    fn collect(
        c: &InMemoryCatalog,
        required: &[DatasetType],
        optional: &[DatasetType],
        prerequisite: &[DatasetType],
        expression: Option<&str>,
    ) -> Result<Vec<Row>, CatalogError> {
        let required: BTreeSet<_> = required.iter().cloned().collect();
        let optional: BTreeSet<_> = optional.iter().cloned().collect();
        let prerequisite: BTreeSet<_> = prerequisite.iter().cloned().collect();
        let per = DimensionSet::empty();
        let origin = OriginInfo::new(["raw"], "run");
        let query = RowQuery {
            required: &required,
            optional: &optional,
            prerequisite: &prerequisite,
            per_dataset_type_dimensions: &per,
            expression,
            origin: &origin,
        };
        c.select_rows(&query)?.collect()
    }

    #[test]
    fn rows_without_required_inputs_are_dropped() {
        let raw = DatasetType::new("raw", dims(&["instrument", "visit"]));
        let calexp = DatasetType::new("calexp", dims(&["instrument", "visit"]));
        let rows = collect(&catalog(), &[raw], &[calexp], &[], None).unwrap();

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.data_id.get("visit"), Some(&1.into()));
        assert!(row.dataset_ref("raw").unwrap().exists());
        assert!(row.dataset_ref("calexp").unwrap().exists());
    }

    #[test]
    fn outputs_not_in_storage_are_unresolved() {
        let calexp = DatasetType::new("calexp", dims(&["instrument", "visit"]));
        let rows = collect(&catalog(), &[], &[calexp], &[], Some("visit = 2")).unwrap();

        assert_eq!(rows.len(), 1);
        let r = rows[0].dataset_ref("calexp").unwrap();
        assert!(!r.exists());
        assert_eq!(r.data_id(), &DataId::new().with("instrument", "HSC").with("visit", 2));
    }

    #[test]
    fn missing_prerequisite_is_a_lookup_failure() {
        let bias = DatasetType::new("bias", dims(&["instrument"]));
        match collect(&catalog(), &[], &[], &[bias], None) {
            Err(CatalogError::Lookup(msg)) => assert!(msg.contains("bias")),
            other => panic!("expected Lookup error, got {other:?}"),
        }
    }

    #[test]
    fn prerequisite_checked_only_for_complete_candidates() {
        // visit 1 has both datasets, visit 2 has neither.
        for input in ["araw", "zraw"] {
            let mut c = catalog();
            for (dataset_type, id) in [(input, 10), ("bias", 11)] {
                c.add_dataset(StoredDataset {
                    collection: "raw".into(),
                    dataset_type: dataset_type.into(),
                    data_id: DataId::new().with("instrument", "HSC").with("visit", 1),
                    id: DatasetId(id),
                });
            }
            let x = DatasetType::new(input, dims(&["instrument", "visit"]));
            let bias = DatasetType::new("bias", dims(&["instrument", "visit"]));

            let rows = collect(&c, &[x], &[], &[bias], None).unwrap();
            assert_eq!(rows.len(), 1, "input named {input}");
            assert_eq!(rows[0].data_id.get("visit"), Some(&1.into()));
        }
    }

    #[test]
    fn bad_expression_fails_before_iteration() {
        let raw = DatasetType::new("raw", dims(&["instrument", "visit"]));
        assert!(matches!(
            collect(&catalog(), &[raw], &[], &[], Some("visit ~ 3")),
            Err(CatalogError::Expression { .. })
        ));
    }

    #[test]
    fn per_dataset_type_dimensions_expand_rows() {
        let mut c = catalog();
        for detector in [10, 11] {
            c.add_dataset(StoredDataset {
                collection: "raw".into(),
                dataset_type: "flat".into(),
                data_id: DataId::new().with("instrument", "HSC").with("detector", detector),
                id: DatasetId(100 + detector as u64),
            });
        }

        let raw = DatasetType::new("raw", dims(&["instrument", "visit"]));
        let flat = DatasetType::new("flat", dims(&["instrument", "detector"]));
        let required: BTreeSet<_> = [raw, flat].into_iter().collect();
        let empty = BTreeSet::new();
        let per = dims(&["detector"]);
        let origin = OriginInfo::new(["raw"], "run");
        let query = RowQuery {
            required: &required,
            optional: &empty,
            prerequisite: &empty,
            per_dataset_type_dimensions: &per,
            expression: None,
            origin: &origin,
        };
        let rows: Vec<Row> = c.select_rows(&query).unwrap().collect::<Result<_, _>>().unwrap();

        assert_eq!(rows.len(), 2);
        let detectors: Vec<_> = rows
            .iter()
            .map(|r| r.dataset_ref("flat").unwrap().data_id().get("detector").cloned())
            .collect();
        assert_eq!(detectors, vec![Some(10.into()), Some(11.into())]);
    }

    #[test]
    fn find_uses_collection_and_type() {
        let c = catalog();
        let raw = DatasetType::new("raw", dims(&["instrument", "visit"]));
        assert!(c.find("raw", &raw).unwrap().is_some());
        assert!(c.find("run", &raw).unwrap().is_none());
    }
}
