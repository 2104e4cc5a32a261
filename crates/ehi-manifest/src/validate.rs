//! Manifest drift validation.
//!
//! For each entity type, the declared union of mapped and skipped columns
//! must equal exactly the set of columns carrying at least one non-null
//! value in the current dataset. Drift blocks dataset onboarding, not
//! ordinary runs: a new export revision grows columns, and every one of
//! them must be deliberately classified before the mapping is trusted.

use tracing::warn;

use ehi_hydrate::{LogicalTable, logical_table};
use ehi_model::{
    ColumnManifest, EngineError, HydrationConfig, HydrationReport, Result,
};
use ehi_store::TableStore;

/// Outcome of validating one manifest against the live merged table.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ManifestValidation {
    pub entity: String,
    pub table: String,
    /// Columns carrying data but classified nowhere. Any entry blocks
    /// onboarding.
    pub unclassified: Vec<String>,
    /// Manifest entries naming columns absent from the live schema.
    /// Reported, but not blocking: exports shed columns across versions.
    pub stale: Vec<String>,
}

impl ManifestValidation {
    pub fn is_blocking(&self) -> bool {
        !self.unclassified.is_empty()
    }

    pub fn into_error(self) -> EngineError {
        EngineError::ManifestDrift {
            entity: self.entity,
            table: self.table,
            unclassified: self.unclassified,
        }
    }
}

/// Validate one manifest against the merged logical view of its table.
pub fn validate_manifest(manifest: &ColumnManifest, table: &LogicalTable) -> ManifestValidation {
    let unclassified = table
        .columns_with_data()
        .into_iter()
        .filter(|column| !manifest.classifies(column))
        .collect();
    let stale = manifest
        .declared_columns()
        .filter(|column| !table.columns.iter().any(|candidate| candidate == column))
        .map(str::to_string)
        .collect();
    ManifestValidation {
        entity: manifest.entity.clone(),
        table: table.name.clone(),
        unclassified,
        stale,
    }
}

/// Validate every manifest in the configuration against the loaded export.
///
/// An entity whose base table is absent has nothing to drift against and is
/// skipped; the coverage report carries the absence.
pub fn validate_all(store: &TableStore, config: &HydrationConfig) -> Result<Vec<ManifestValidation>> {
    let mut report = HydrationReport::default();
    let mut validations = Vec::new();
    for manifest in &config.manifests {
        let Some(table) = logical_table(store, config, &manifest.table, &mut report)? else {
            warn!(
                entity = manifest.entity.as_str(),
                table = manifest.table.as_str(),
                "manifest table absent from export; drift not checkable"
            );
            continue;
        };
        let validation = validate_manifest(manifest, &table);
        if !validation.stale.is_empty() {
            warn!(
                entity = validation.entity.as_str(),
                stale = validation.stale.len(),
                "manifest names columns absent from the live schema"
            );
        }
        validations.push(validation);
    }
    Ok(validations)
}

/// The onboarding gate: the first blocking validation aborts with its
/// exact gaps named.
pub fn enforce(validations: Vec<ManifestValidation>) -> Result<Vec<ManifestValidation>> {
    if let Some(position) = validations.iter().position(ManifestValidation::is_blocking) {
        let mut validations = validations;
        return Err(validations.swap_remove(position).into_error());
    }
    Ok(validations)
}
