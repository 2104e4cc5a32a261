//! Split-table reconciliation.
//!
//! Source-system width limits split wide tables across several physical
//! files, and the primary-key column name drifts per split. The join map is
//! always configuration, never inferred.

use std::collections::BTreeMap;

use tracing::warn;

use ehi_model::{HydrationReport, PhysicalTable, Record, Result, SplitGroup, Value};
use ehi_store::TableStore;

/// The merged, logical view of a base table plus its present splits:
/// exactly one record per base row, columns the union of base and member
/// columns with base values winning any name collision.
#[derive(Debug, Clone)]
pub struct LogicalTable {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

impl LogicalTable {
    /// Wrap a standalone table that has no split group.
    pub fn from_physical(table: &PhysicalTable) -> Self {
        let rows = (0..table.row_count())
            .filter_map(|row| table.record(row))
            .collect();
        Self {
            name: table.name.clone(),
            columns: table.columns().to_vec(),
            rows,
        }
    }

    pub fn rows_where(&self, column: &str, needle: &str) -> Vec<&Record> {
        self.rows
            .iter()
            .filter(|record| {
                record
                    .get(column)
                    .map(|value| value.display_text() == needle)
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Columns carrying at least one non-missing value across the merge.
    pub fn columns_with_data(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|column| {
                self.rows.iter().any(|record| {
                    record
                        .get(column)
                        .map(|value| !value.is_missing())
                        .unwrap_or(false)
                })
            })
            .cloned()
            .collect()
    }
}

/// Left-join every present member of a split group onto its base table.
///
/// Returns `None` when the base table itself is absent from this export.
/// A member without the configured join column degrades to absent rather
/// than aborting: exports vary across source-system versions.
pub fn merge_split_group(
    store: &TableStore,
    group: &SplitGroup,
    report: &mut HydrationReport,
) -> Result<Option<LogicalTable>> {
    let Some(base) = store.table(&group.base_table) else {
        report.note_missing_table(&group.base_table);
        return Ok(None);
    };

    struct PresentMember<'a> {
        table: &'a PhysicalTable,
        // join value -> first row holding it
        by_join: BTreeMap<String, usize>,
    }

    let mut members: Vec<PresentMember<'_>> = Vec::new();
    for member in &group.members {
        let Some(table) = store.table(&member.table) else {
            report.note_missing_table(&member.table);
            continue;
        };
        if !table.has_column(&member.join_column) {
            warn!(
                table = member.table.as_str(),
                join_column = member.join_column.as_str(),
                "split member lacks configured join column; treating split as absent"
            );
            report.note_degraded_join(&member.table);
            continue;
        }
        let mut by_join: BTreeMap<String, usize> = BTreeMap::new();
        let mut conflicts = 0u64;
        for row in 0..table.row_count() {
            let Some(value) = table.value(row, &member.join_column) else {
                continue;
            };
            if value.is_missing() {
                continue;
            }
            let key = value.display_text();
            if by_join.contains_key(&key) {
                conflicts += 1;
            } else {
                by_join.insert(key, row);
            }
        }
        if conflicts > 0 {
            warn!(
                table = member.table.as_str(),
                rows = conflicts,
                "split member carries duplicate join values; first physical row wins"
            );
            report.note_split_conflict(&member.table, conflicts);
        }
        members.push(PresentMember { table, by_join });
    }

    // Union column list: base first, then each member's columns in physical
    // order, skipping names the base (or an earlier member) already owns.
    let mut columns: Vec<String> = base.columns().to_vec();
    for member in &members {
        for column in member.table.columns() {
            if !columns.iter().any(|existing| existing == column) {
                columns.push(column.clone());
            }
        }
    }

    let base_pk = base.column_index(&group.base_pk_column);
    if base_pk.is_none() {
        warn!(
            table = group.base_table.as_str(),
            pk_column = group.base_pk_column.as_str(),
            "base table lacks configured primary-key column; members join nothing"
        );
        report.note_degraded_join(&group.base_table);
    }
    let mut rows = Vec::with_capacity(base.row_count());
    for base_row in 0..base.row_count() {
        let mut record = Record::new(group.base_table.clone());
        record.columns = base.columns().to_vec();
        record.values = base
            .row_cells(base_row)
            .map(<[Value]>::to_vec)
            .unwrap_or_default();

        let key = base_pk
            .and_then(|position| record.values.get(position))
            .map(Value::display_text);

        for member in &members {
            let member_row = key
                .as_deref()
                .filter(|key| !key.is_empty())
                .and_then(|key| member.by_join.get(key).copied());
            for (position, column) in member.table.columns().iter().enumerate() {
                let value = match member_row {
                    Some(row) => member
                        .table
                        .row_cells(row)
                        .map(|cells| cells[position].clone())
                        .unwrap_or(Value::Missing),
                    None => Value::Missing,
                };
                record.push_unless_present(column, value);
            }
        }
        rows.push(record);
    }

    Ok(Some(LogicalTable {
        name: group.base_table.clone(),
        columns,
        rows,
    }))
}
