use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use qgraph::catalog::{Catalog, CatalogError, Row, RowIter, RowQuery};
use qgraph::dataset::{DatasetRef, DatasetType};
use qgraph::dimensions::DimensionUniverse;
use qgraph::graph::{BuildEvent, BuildObserver};

/// A fake catalog that:
/// - returns a preset list of rows for every query, ignoring the query
/// - optionally fails with a lookup error after the preset rows
/// - answers `find` from a preset list of (collection, ref) pairs
/// - counts how many times it was queried.
#[derive(Debug)]
pub struct FixedRowsCatalog {
    universe: DimensionUniverse,
    rows: Vec<Row>,
    lookup_failure: Option<String>,
    stored: Vec<(String, DatasetRef)>,
    queries: AtomicUsize,
}

impl FixedRowsCatalog {
    pub fn new(universe: DimensionUniverse, rows: Vec<Row>) -> Self {
        Self {
            universe,
            rows,
            lookup_failure: None,
            stored: Vec::new(),
            queries: AtomicUsize::new(0),
        }
    }

    /// End the row sequence with `CatalogError::Lookup(message)`.
    pub fn failing_lookup(mut self, message: &str) -> Self {
        self.lookup_failure = Some(message.to_string());
        self
    }

    /// Make `dataset_ref` findable in `collection`.
    pub fn with_stored(mut self, collection: &str, dataset_ref: DatasetRef) -> Self {
        self.stored.push((collection.to_string(), dataset_ref));
        self
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl Catalog for FixedRowsCatalog {
    fn universe(&self) -> &DimensionUniverse {
        &self.universe
    }

    fn select_rows(&self, _query: &RowQuery<'_>) -> Result<RowIter<'_>, CatalogError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let failure = self
            .lookup_failure
            .clone()
            .map(|msg| Err(CatalogError::Lookup(msg)));
        Ok(Box::new(self.rows.iter().cloned().map(Ok).chain(failure)))
    }

    fn find(
        &self,
        collection: &str,
        dataset_type: &DatasetType,
    ) -> Result<Option<DatasetRef>, CatalogError> {
        Ok(self
            .stored
            .iter()
            .find(|(c, r)| c == collection && r.dataset_type() == dataset_type)
            .map(|(_, r)| r.clone()))
    }
}

/// Observer that keeps every event it receives.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<BuildEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<BuildEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Number of `QuantumSkipped` events for `task`.
    pub fn skipped(&self, task: &str) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| matches!(e, BuildEvent::QuantumSkipped { task: t, .. } if t == task))
            .count()
    }
}

impl BuildObserver for RecordingObserver {
    fn on_event(&self, event: &BuildEvent) {
        let mut guard = self.events.lock().unwrap();
        guard.push(event.clone());
    }
}
