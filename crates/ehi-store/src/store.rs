//! The read-only table store.
//!
//! Exports are partial by design: any declared table's presence must be
//! probed before querying. `table()` returning `None` is the ordinary
//! "missing table" path, never an error.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use ehi_model::PhysicalTable;

use crate::error::{Result, StoreError};
use crate::load::read_table;

#[derive(Debug, Default)]
pub struct TableStore {
    tables: BTreeMap<String, PhysicalTable>,
}

impl TableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `.tsv`/`.csv` file in `dir`, one table per file, named by
    /// the file stem. Files load in filename order for determinism.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut store = Self::new();
        for path in list_table_files(dir)? {
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let table = read_table(&path, stem.trim())?;
            debug!(
                table = table.name.as_str(),
                rows = table.row_count(),
                columns = table.columns().len(),
                "loaded table"
            );
            store.insert(table);
        }
        info!(tables = store.len(), dir = %dir.display(), "export loaded");
        Ok(store)
    }

    pub fn insert(&mut self, table: PhysicalTable) {
        self.tables.insert(table.name.clone(), table);
    }

    /// Probe for a table. Absent tables are expected in partial exports.
    pub fn table(&self, name: &str) -> Option<&PhysicalTable> {
        self.tables.get(name)
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// List table files in a directory, sorted by filename.
pub fn list_table_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(StoreError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }
    let entries = std::fs::read_dir(dir).map_err(|source| StoreError::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| StoreError::DirectoryRead {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_table = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("tsv") || ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if is_table {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
