use serde::{Deserialize, Serialize};

/// Declared partition of one entity's source columns into intentionally
/// mapped and intentionally skipped.
///
/// Re-validated against the live schema and data of every dataset run: the
/// union of both lists must account for every column carrying data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnManifest {
    pub entity: String,
    /// Base table of the entity (splits validate against the merged view).
    pub table: String,
    pub mapped: Vec<String>,
    pub skipped: Vec<String>,
}

impl ColumnManifest {
    pub fn classifies(&self, column: &str) -> bool {
        self.is_mapped(column) || self.skipped.iter().any(|name| name == column)
    }

    pub fn is_mapped(&self, column: &str) -> bool {
        self.mapped.iter().any(|name| name == column)
    }

    /// Every column the manifest names, in declaration order.
    pub fn declared_columns(&self) -> impl Iterator<Item = &str> {
        self.mapped
            .iter()
            .chain(self.skipped.iter())
            .map(String::as_str)
    }
}
