#![deny(unsafe_code)]

use std::collections::BTreeMap;

use crate::error::{EngineError, Result};
use crate::value::Value;

/// One physical table from the export: a name, an ordered column list, and
/// rows whose cells align positionally with the columns. Loaded once,
/// read-only thereafter.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PhysicalTable {
    pub name: String,
    columns: Vec<String>,
    #[serde(skip)]
    index: BTreeMap<String, usize>,
    rows: Vec<Vec<Value>>,
}

impl PhysicalTable {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Result<Self> {
        let name = name.into();
        let mut index = BTreeMap::new();
        for (position, column) in columns.iter().enumerate() {
            if index.insert(column.clone(), position).is_some() {
                return Err(EngineError::DuplicateColumn {
                    table: name,
                    column: column.clone(),
                });
            }
        }
        Ok(Self {
            name,
            columns,
            index,
            rows: Vec::new(),
        })
    }

    /// Append a row, padding short records with `Missing` and dropping
    /// trailing cells beyond the declared width.
    pub fn push_row(&mut self, mut cells: Vec<Value>) {
        cells.resize(self.columns.len(), Value::Missing);
        self.rows.push(cells);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.index.contains_key(column)
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at (row, column), or None when the column is not declared.
    /// Callers that need the guarded failure path go through `GuardedRow`.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let position = self.column_index(column)?;
        self.rows.get(row).map(|cells| &cells[position])
    }

    pub fn row_cells(&self, row: usize) -> Option<&[Value]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    /// Row indices where `column` equals `needle` (by display text).
    /// An undeclared column matches nothing.
    pub fn rows_where(&self, column: &str, needle: &str) -> Vec<usize> {
        let Some(position) = self.column_index(column) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, cells)| cells[position].display_text() == needle)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Materialize one row as a standalone record.
    pub fn record(&self, row: usize) -> Option<Record> {
        self.rows.get(row).map(|cells| Record {
            table: self.name.clone(),
            columns: self.columns.clone(),
            values: cells.clone(),
        })
    }

    /// Columns carrying at least one non-missing value.
    pub fn columns_with_data(&self) -> Vec<String> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(position, _)| self.rows.iter().any(|cells| !cells[*position].is_missing()))
            .map(|(_, column)| column.clone())
            .collect()
    }

    /// Rebuild the column index after deserialization.
    pub fn reindex(&mut self) {
        self.index = self
            .columns
            .iter()
            .enumerate()
            .map(|(position, column)| (column.clone(), position))
            .collect();
    }
}

/// A standalone row: the owning table label, its columns, and the cell
/// values. Merged logical rows and attached children are all records.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Record {
    pub table: String,
    pub columns: Vec<String>,
    pub values: Vec<Value>,
}

impl Record {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Unchecked cell access; None means the column is not declared here.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|name| name == column)
            .map(|position| &self.values[position])
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|name| name == column)
    }

    /// Append a column, keeping an existing cell when the name is taken.
    /// Returns whether the value was inserted.
    pub fn push_unless_present(&mut self, column: &str, value: Value) -> bool {
        if self.has_column(column) {
            return false;
        }
        self.columns.push(column.to_string());
        self.values.push(value);
        true
    }

    pub fn to_map(&self) -> BTreeMap<&str, &Value> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_columns_are_rejected() {
        let result = PhysicalTable::new("PATIENT", vec!["ID".into(), "ID".into()]);
        assert!(matches!(result, Err(EngineError::DuplicateColumn { .. })));
    }

    #[test]
    fn push_row_pads_and_truncates() {
        let mut table =
            PhysicalTable::new("PATIENT", vec!["A".into(), "B".into()]).expect("table");
        table.push_row(vec![Value::from_cell("1")]);
        table.push_row(vec![
            Value::from_cell("2"),
            Value::from_cell("3"),
            Value::from_cell("4"),
        ]);
        assert_eq!(table.value(0, "B"), Some(&Value::Missing));
        assert_eq!(table.value(1, "B"), Some(&Value::Text("3".to_string())));
        assert_eq!(table.value(1, "C"), None);
    }

    #[test]
    fn columns_with_data_skips_all_missing() {
        let mut table =
            PhysicalTable::new("T", vec!["A".into(), "B".into()]).expect("table");
        table.push_row(vec![Value::from_cell("x"), Value::Missing]);
        assert_eq!(table.columns_with_data(), vec!["A".to_string()]);
    }
}
