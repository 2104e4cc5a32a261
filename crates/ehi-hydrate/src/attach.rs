//! Declarative child attachment.
//!
//! Structural children live in flat tables keyed by a foreign-key column;
//! each ChildSpec nests them under its attachment key. Attaching one spec
//! never affects another spec's result, and no attachment ever overwrites a
//! source column on the parent (the collision check runs before hydration).

use std::collections::BTreeSet;

use tracing::warn;

use ehi_model::{Cardinality, ChildSpec, EngineError, Record, Result, Value};
use ehi_store::TableStore;

fn sort_value(record: &Record, column: &str) -> Value {
    record.get(column).cloned().unwrap_or(Value::Missing)
}

/// Rows matching one parent under one spec, or `None` when the child table
/// (or its configured foreign-key column) is absent from this export.
///
/// `None` still hydrates as an empty attachment; it is distinct only so the
/// caller can record the degradation once per spec rather than per parent.
pub fn select_children(
    store: &TableStore,
    spec: &ChildSpec,
    parent_id: &str,
) -> Result<Option<Vec<Record>>> {
    let Some(table) = store.table(&spec.source_table) else {
        return Ok(None);
    };
    if !table.has_column(&spec.foreign_key_column) {
        return Ok(None);
    }

    let matches = table.rows_where(&spec.foreign_key_column, parent_id);
    let mut rows: Vec<Record> = matches
        .into_iter()
        .filter_map(|row| table.record(row))
        .collect();

    if let Some(sort_column) = spec.sort_column.as_deref() {
        // Stable sort: physical order breaks remaining ties for `many`.
        rows.sort_by(|a, b| sort_value(a, sort_column).compare(&sort_value(b, sort_column)));
    }

    match spec.cardinality {
        Cardinality::Many => Ok(Some(rows)),
        Cardinality::One => {
            if rows.len() <= 1 {
                return Ok(Some(rows));
            }
            let Some(sort_column) = spec.sort_column.as_deref() else {
                return Err(ambiguous(spec, parent_id, rows.len()));
            };
            let first = sort_value(&rows[0], sort_column);
            let second = sort_value(&rows[1], sort_column);
            if first.compare(&second).is_eq() {
                return Err(ambiguous(spec, parent_id, rows.len()));
            }
            rows.truncate(1);
            Ok(Some(rows))
        }
    }
}

fn ambiguous(spec: &ChildSpec, parent_id: &str, candidates: usize) -> EngineError {
    EngineError::AmbiguousOrdering {
        context: format!(
            "child {} under {:?} for parent {}",
            spec.source_table, spec.attachment_key, parent_id
        ),
        candidates,
    }
}

/// Count child rows whose non-missing foreign key matches no parent id.
///
/// Some orphaning is expected in real exports (edits to since-removed
/// parents); the contract is that it is visible as a count. Returns `None`
/// when the table or its foreign-key column is absent.
pub fn count_orphans(
    store: &TableStore,
    spec: &ChildSpec,
    parent_ids: &BTreeSet<String>,
) -> Option<u64> {
    let table = store.table(&spec.source_table)?;
    let position = table.column_index(&spec.foreign_key_column)?;
    let mut orphans = 0u64;
    for row in 0..table.row_count() {
        let Some(cells) = table.row_cells(row) else {
            continue;
        };
        let value = &cells[position];
        if value.is_missing() {
            continue;
        }
        if !parent_ids.contains(&value.display_text()) {
            orphans += 1;
        }
    }
    if orphans > 0 {
        warn!(
            table = spec.source_table.as_str(),
            foreign_key = spec.foreign_key_column.as_str(),
            orphans,
            "child rows reference no loaded parent"
        );
    }
    Some(orphans)
}
