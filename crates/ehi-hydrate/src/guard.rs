//! Runtime column guard.
//!
//! The export's schema is optional and silently wrong when misused: an
//! unchecked read of a misspelled column would return an absent value
//! instead of failing. Every row access in the engine goes through this
//! guard, which fails immediately and names the row's source table, its
//! real column list, and the case-insensitive near-match when one exists.

use std::collections::BTreeSet;

use ehi_model::{CaseInsensitiveSet, EngineError, Record, Result, Value};

static MISSING: Value = Value::Missing;

/// A record wrapped for checked column access, with an explicit allow-list
/// for synthetic fields (attachment keys, derived names).
#[derive(Debug)]
pub struct GuardedRow<'a> {
    record: &'a Record,
    synthetic: Option<&'a BTreeSet<String>>,
}

impl<'a> GuardedRow<'a> {
    pub fn new(record: &'a Record) -> Self {
        Self {
            record,
            synthetic: None,
        }
    }

    pub fn with_synthetic(record: &'a Record, synthetic: &'a BTreeSet<String>) -> Self {
        Self {
            record,
            synthetic: Some(synthetic),
        }
    }

    /// Checked cell access. Synthetic names resolve to `Missing` here; the
    /// entity layer supplies their actual values.
    pub fn get(&self, column: &str) -> Result<&'a Value> {
        if let Some(value) = self.record.get(column) {
            return Ok(value);
        }
        if let Some(synthetic) = self.synthetic {
            if synthetic.contains(column) {
                return Ok(&MISSING);
            }
        }
        Err(undeclared(self.record, column, self.synthetic))
    }

    /// Display text of a checked cell ("" for missing).
    pub fn text(&self, column: &str) -> Result<String> {
        Ok(self.get(column)?.display_text())
    }
}

/// Build the `UndeclaredColumn` error for a record, listing the real
/// columns and suggesting the case-insensitive match when one exists.
pub fn undeclared(
    record: &Record,
    column: &str,
    synthetic: Option<&BTreeSet<String>>,
) -> EngineError {
    let mut available = record.columns.clone();
    if let Some(synthetic) = synthetic {
        available.extend(synthetic.iter().cloned());
    }
    undeclared_in(&record.table, available, column)
}

/// Same failure for a table-level check, before any row is in hand.
pub fn undeclared_in(table: &str, available: Vec<String>, column: &str) -> EngineError {
    let suggestion = CaseInsensitiveSet::new(&available)
        .get(column)
        .map(str::to_string);
    EngineError::UndeclaredColumn {
        table: table.to_string(),
        column: column.to_string(),
        available,
        suggestion,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> Record {
        Record {
            table: "PAT_ENC".to_string(),
            columns: vec!["PAT_ID".to_string(), "PAT_ENC_CSN_ID".to_string()],
            values: vec![Value::from_cell("Z100"), Value::from_cell("724001")],
        }
    }

    #[test]
    fn declared_column_reads() {
        let record = record();
        let row = GuardedRow::new(&record);
        assert_eq!(row.text("PAT_ID").expect("declared"), "Z100");
    }

    #[test]
    fn undeclared_column_fails_with_suggestion() {
        let record = record();
        let row = GuardedRow::new(&record);
        let error = row.get("pat_enc_csn_id").expect_err("undeclared");
        let message = error.to_string();
        assert!(message.contains("PAT_ENC"));
        assert!(message.contains("did you mean \"PAT_ENC_CSN_ID\"?"));
    }

    #[test]
    fn synthetic_names_are_exempt() {
        let record = record();
        let synthetic: BTreeSet<String> = ["diagnoses".to_string()].into();
        let row = GuardedRow::with_synthetic(&record, &synthetic);
        assert_eq!(row.get("diagnoses").expect("allow-listed"), &Value::Missing);
        assert!(row.get("diagnoses_typo").is_err());
    }
}
