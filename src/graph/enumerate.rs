// src/graph/enumerate.rs

use tracing::{debug, debug_span};

use crate::catalog::{Catalog, Row, RowQuery};
use crate::errors::Result;

/// Run the row query once and drain it.
///
/// Every task's assembly reads the full row set, so the single-pass
/// iterator is materialized here. The first error stops the drain; a
/// catalog lookup failure comes back as `PrerequisiteMissing`.
pub fn enumerate_rows<C: Catalog + ?Sized>(catalog: &C, query: &RowQuery<'_>) -> Result<Vec<Row>> {
    let span = debug_span!("enumerate_rows", expression = ?query.expression);
    let _guard = span.enter();

    let mut rows = Vec::new();
    for row in catalog.select_rows(query)? {
        let row = row?;
        debug!(%row, "row");
        rows.push(row);
    }

    debug!(count = rows.len(), "rows enumerated");
    Ok(rows)
}
