//! Dimension table lookups.
//!
//! Shared `{id, display name}` tables resolve foreign-key ids to names.
//! The contract is total: an unloaded table, an undeclared column, or an
//! unmatched id all return `None`, never an error.

use crate::store::TableStore;

/// Resolve `id` against a dimension table, returning its display name.
pub fn lookup_name(
    store: &TableStore,
    table: &str,
    id_column: &str,
    name_column: &str,
    id: &str,
) -> Option<String> {
    let table = store.table(table)?;
    if !table.has_column(id_column) || !table.has_column(name_column) {
        return None;
    }
    let matches = table.rows_where(id_column, id);
    let row = *matches.first()?;
    let value = table.value(row, name_column)?;
    if value.is_missing() {
        return None;
    }
    Some(value.display_text())
}
