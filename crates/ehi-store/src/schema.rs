//! Schema catalog: per-table column metadata from the export's schema
//! description resource.
//!
//! Consumed only by manifest validation, typed projection, and codegen,
//! never at hydration time. Hydration sees only the tables that actually
//! loaded.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    #[serde(alias = "varchar", alias = "string", alias = "char")]
    Text,
    #[serde(alias = "int", alias = "bigint")]
    Integer,
    #[serde(alias = "numeric", alias = "real", alias = "decimal")]
    Float,
    #[serde(alias = "timestamp", alias = "date")]
    Datetime,
}

impl ColumnType {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(default)]
    pub data_type: ColumnType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSchema {
    pub table: String,
    pub columns: Vec<ColumnInfo>,
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    tables: BTreeMap<String, TableSchema>,
}

impl SchemaCatalog {
    pub fn new(tables: Vec<TableSchema>) -> Self {
        let tables = tables
            .into_iter()
            .map(|schema| (schema.table.clone(), schema))
            .collect();
        Self { tables }
    }

    /// Load the catalog from a JSON array of table schemas.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| StoreError::ReadSchema {
            path: path.to_path_buf(),
            source,
        })?;
        let tables: Vec<TableSchema> =
            serde_json::from_str(&raw).map_err(|source| StoreError::ParseSchema {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::new(tables))
    }

    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.get(name)
    }

    pub fn column_type(&self, table: &str, column: &str) -> Option<ColumnType> {
        self.table(table)
            .and_then(|schema| schema.column(column))
            .map(|info| info.data_type)
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableSchema> {
        self.tables.values()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
