//! Delimited table loading.
//!
//! EHI exports ship one delimited file per physical table with a single
//! header row. Tab-separated is the primary format; comma-separated files
//! are accepted for fixtures and hand-built datasets.

use std::path::Path;

use csv::ReaderBuilder;

use ehi_model::{PhysicalTable, Value};

use crate::error::{Result, StoreError};

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

fn delimiter_for(path: &Path) -> u8 {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => b',',
        _ => b'\t',
    }
}

/// Read one export file into a physical table named `table_name`.
pub fn read_table(path: &Path, table_name: &str) -> Result<PhysicalTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter_for(path))
        .from_path(path)
        .map_err(|source| StoreError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record.map_err(|source| StoreError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?,
        None => return Ok(PhysicalTable::new(table_name, Vec::new())?),
    };
    let columns: Vec<String> = header.iter().map(normalize_header).collect();
    let mut table = PhysicalTable::new(table_name, columns)?;

    for record in records {
        let record = record.map_err(|source| StoreError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let cells: Vec<Value> = record
            .iter()
            .map(|cell| Value::from_cell(&normalize_cell(cell)))
            .collect();
        table.push_row(cells);
    }
    Ok(table)
}
