// src/graph/assemble.rs

//! Grouping rows into quanta for one task.

use std::collections::BTreeMap;

use tracing::{debug, info, info_span};

use crate::catalog::Row;
use crate::dataset::{DatasetRef, DatasetType, DatasetTypeName};
use crate::dimensions::{DataId, DimensionValue};
use crate::errors::{GraphBuilderError, Result};
use crate::graph::events::{BuildEvent, BuildObserver};
use crate::graph::extract::TaskDatasetTypes;
use crate::graph::quantum::{Quantum, TaskNode};
use crate::types::ExistingOutputs;

type GroupKey = Vec<(String, DimensionValue)>;

/// Refs of one dataset-type role, deduplicated by coordinates.
type RefMap = BTreeMap<DatasetTypeName, BTreeMap<DataId, DatasetRef>>;

#[derive(Debug, Default)]
struct Group {
    inputs: RefMap,
    outputs: RefMap,
}

/// Build the [`TaskNode`] for one task from the shared row set.
///
/// Rows are grouped by their coordinates on the task's quantum link
/// dimensions; each group becomes at most one quantum. Groups come out in
/// key order.
pub fn assemble_task(
    task: &TaskDatasetTypes,
    rows: &[Row],
    existing_outputs: ExistingOutputs,
    observer: &dyn BuildObserver,
) -> Result<TaskNode> {
    let span = info_span!("assemble_task", task = %task.label());
    let _guard = span.enter();

    let mut groups: BTreeMap<GroupKey, Group> = BTreeMap::new();
    for row in rows {
        let key = row.data_id.project(&task.quantum_links).ok_or_else(|| {
            GraphBuilderError::MalformedRow(format!(
                "row {} lacks quantum dimensions [{}] of task {}",
                row.data_id,
                task.quantum_links.join(", "),
                task.label()
            ))
        })?;
        debug!(key = ?key, "grouping row");

        let group = groups.entry(key).or_default();
        collect_refs(&mut group.inputs, task.inputs.iter(), row, task)?;
        collect_refs(&mut group.outputs, task.outputs.iter(), row, task)?;
    }

    let mut quanta = Vec::with_capacity(groups.len());
    for (key, group) in groups {
        let outputs: Vec<DatasetRef> = group.outputs.into_values().flat_map(|m| m.into_values()).collect();
        let existing: Vec<DatasetRef> = outputs.iter().filter(|r| r.exists()).cloned().collect();

        if existing_outputs.skips() && existing.len() == outputs.len() {
            info!(key = ?key, outputs = outputs.len(), "all outputs exist; skipping quantum");
            observer.on_event(&BuildEvent::QuantumSkipped {
                task: task.label().to_string(),
                outputs,
            });
            continue;
        }
        if !existing.is_empty() {
            return Err(GraphBuilderError::OutputExists {
                task: task.label().to_string(),
                refs: existing,
            });
        }

        let mut quantum = Quantum::new();
        for r in outputs {
            quantum.add_output(r);
        }
        for r in group.inputs.into_values().flat_map(|m| m.into_values()) {
            quantum.add_predicted_input(r);
        }

        let inputs = quantum.input_refs().count();
        let outputs = quantum.output_refs().count();
        debug!(key = ?key, inputs, outputs, "created quantum");
        observer.on_event(&BuildEvent::QuantumCreated {
            task: task.label().to_string(),
            inputs,
            outputs,
        });
        quanta.push(quantum);
    }

    info!(quanta = quanta.len(), "task assembled");
    observer.on_event(&BuildEvent::TaskAssembled {
        task: task.label().to_string(),
        quanta: quanta.len(),
    });

    Ok(TaskNode {
        task_def: task.task_def.clone(),
        quanta,
    })
}

fn collect_refs<'a>(
    into: &mut RefMap,
    dataset_types: impl Iterator<Item = &'a DatasetType>,
    row: &Row,
    task: &TaskDatasetTypes,
) -> Result<()> {
    for dt in dataset_types {
        let r = row.dataset_ref(dt.name()).ok_or_else(|| {
            GraphBuilderError::MalformedRow(format!(
                "row {} has no reference for {} needed by task {}",
                row.data_id,
                dt.name(),
                task.label()
            ))
        })?;
        into.entry(dt.name().to_string())
            .or_default()
            .entry(r.data_id().clone())
            .or_insert_with(|| r.clone());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::dataset::DatasetId;
    use crate::dimensions::DimensionSet;
    use crate::graph::events::NoopObserver;
    use crate::pipeline::{DeclaredTask, TaskDef};

    #[derive(Debug, Default)]
    struct Events(Mutex<Vec<BuildEvent>>);

    impl BuildObserver for Events {
        fn on_event(&self, event: &BuildEvent) {
            self.0.lock().unwrap().push(event.clone());
        }
    }

    fn raw() -> DatasetType {
        DatasetType::new("raw", DimensionSet::from_names(["visit", "detector"]))
    }

    fn calexp() -> DatasetType {
        DatasetType::new("calexp", DimensionSet::from_names(["visit"]))
    }

    fn task() -> TaskDatasetTypes {
        let cfg = toml::from_str("label = \"calibrate\"").unwrap();
        TaskDatasetTypes {
            task_def: TaskDef::from_config(cfg).resolved(Arc::new(DeclaredTask), "t".into()),
            inputs: [raw()].into_iter().collect(),
            outputs: [calexp()].into_iter().collect(),
            init_inputs: BTreeSet::new(),
            init_outputs: BTreeSet::new(),
            per_dataset_type_dimensions: DimensionSet::empty(),
            prerequisites: BTreeSet::new(),
            quantum_links: vec!["visit".into()],
        }
    }

    fn row(visit: i64, detector: i64, calexp_id: Option<u64>) -> Row {
        let data_id = DataId::new().with("visit", visit).with("detector", detector);
        let out_id = DataId::new().with("visit", visit);
        let out = match calexp_id {
            Some(id) => DatasetRef::resolved(calexp(), out_id, DatasetId(id)),
            None => DatasetRef::new(calexp(), out_id),
        };
        Row::new(data_id.clone())
            .with_ref(DatasetRef::resolved(raw(), data_id, DatasetId((visit * 10 + detector) as u64)))
            .with_ref(out)
    }

    #[test]
    fn rows_fold_by_quantum_key() {
        let rows = vec![row(1, 1, None), row(1, 2, None), row(2, 1, None)];
        let node = assemble_task(&task(), &rows, ExistingOutputs::Skip, &NoopObserver).unwrap();

        assert_eq!(node.quanta.len(), 2);
        let first = &node.quanta[0];
        assert_eq!(first.predicted_inputs()["raw"].len(), 2);
        assert_eq!(first.outputs()["calexp"].len(), 1);
    }

    #[test]
    fn duplicate_rows_are_deduplicated() {
        let rows = vec![row(1, 1, None), row(1, 1, None)];
        let node = assemble_task(&task(), &rows, ExistingOutputs::Skip, &NoopObserver).unwrap();
        assert_eq!(node.quanta.len(), 1);
        assert_eq!(node.quanta[0].input_refs().count(), 1);
    }

    #[test]
    fn existing_outputs_are_skipped() {
        let events = Events::default();
        let rows = vec![row(1, 1, Some(5)), row(2, 1, None)];
        let node = assemble_task(&task(), &rows, ExistingOutputs::Skip, &events).unwrap();

        assert_eq!(node.quanta.len(), 1);
        let events = events.0.lock().unwrap();
        assert!(matches!(&events[0], BuildEvent::QuantumSkipped { task, .. } if task == "calibrate"));
        assert!(matches!(&events[2], BuildEvent::TaskAssembled { quanta: 1, .. }));
    }

    #[test]
    fn existing_outputs_fail_when_not_skipping() {
        let rows = vec![row(1, 1, Some(5))];
        match assemble_task(&task(), &rows, ExistingOutputs::Fail, &NoopObserver) {
            Err(GraphBuilderError::OutputExists { task, refs }) => {
                assert_eq!(task, "calibrate");
                assert_eq!(refs.len(), 1);
                assert_eq!(refs[0].dataset_type().name(), "calexp");
            }
            other => panic!("expected OutputExists, got {other:?}"),
        }
    }

    #[test]
    fn partially_existing_outputs_fail_even_when_skipping() {
        let extra = DatasetType::new("background", DimensionSet::from_names(["visit"]));
        let mut t = task();
        t.outputs.insert(extra.clone());
        let r = row(1, 1, Some(5)).with_ref(DatasetRef::new(extra, DataId::new().with("visit", 1)));

        let err = assemble_task(&t, &[r], ExistingOutputs::Skip, &NoopObserver).unwrap_err();
        match err {
            GraphBuilderError::OutputExists { refs, .. } => {
                assert_eq!(refs.len(), 1);
                assert_eq!(refs[0].dataset_type().name(), "calexp");
            }
            other => panic!("expected OutputExists, got {other:?}"),
        }
    }

    #[test]
    fn task_without_outputs_is_skipped_when_skipping() {
        let mut t = task();
        t.outputs.clear();
        let rows = vec![row(1, 1, None)];

        let skipped = assemble_task(&t, &rows, ExistingOutputs::Skip, &NoopObserver).unwrap();
        assert!(skipped.quanta.is_empty());

        let kept = assemble_task(&t, &rows, ExistingOutputs::Fail, &NoopObserver).unwrap();
        assert_eq!(kept.quanta.len(), 1);
    }

    #[test]
    fn row_without_key_dimension_is_malformed() {
        let r = Row::new(DataId::new().with("detector", 1));
        assert!(matches!(
            assemble_task(&task(), &[r], ExistingOutputs::Skip, &NoopObserver),
            Err(GraphBuilderError::MalformedRow(_))
        ));
    }

    #[test]
    fn no_rows_gives_empty_node() {
        let node = assemble_task(&task(), &[], ExistingOutputs::Skip, &NoopObserver).unwrap();
        assert_eq!(node.label(), "calibrate");
        assert!(node.quanta.is_empty());
    }
}
