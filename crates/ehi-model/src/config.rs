//! Declarative hydration configuration.
//!
//! Join relationships are always supplied here, never inferred from column
//! naming: primary-key column names drift unpredictably across splits of the
//! same logical table. The per-entity mappings themselves are data files;
//! these types are the contract the engine hydrates them through.

use serde::{Deserialize, Serialize};

use crate::manifest::ColumnManifest;

/// One logical table physically split across several files.
///
/// Each member exposes the base table's primary key under its own join
/// column name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitGroup {
    pub base_table: String,
    pub base_pk_column: String,
    pub members: Vec<SplitMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitMember {
    pub table: String,
    pub join_column: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    One,
    Many,
}

/// A structural child attached under `attachment_key`.
///
/// `attachment_key` must not collide with any source column of the parent's
/// base or member tables; the collision check is what lets downstream code
/// tell synthetic fields apart from source data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildSpec {
    pub source_table: String,
    pub foreign_key_column: String,
    pub attachment_key: String,
    pub cardinality: Cardinality,
    /// Secondary sort for `cardinality: one` when several rows match.
    /// Without it, a multi-row match is ambiguous and fails.
    #[serde(default)]
    pub sort_column: Option<String>,
}

/// A display name resolved through a dimension table and attached as a
/// synthetic field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedField {
    pub name: String,
    pub source_column: String,
    pub lookup_table: String,
    pub lookup_id_column: String,
    pub lookup_name_column: String,
}

/// One entity collection: where its rows come from, how they are identified,
/// and what hangs off them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityMapping {
    /// Collection name in the output document (e.g. "encounters").
    pub name: String,
    /// Base table; when a `SplitGroup` names it, the merged logical table
    /// is hydrated instead of the bare file.
    pub base_table: String,
    /// Canonical id column on the (merged) row.
    pub id_column: String,
    /// Column holding the subject key the run filters on.
    pub subject_column: String,
    /// Contact serial identity for the cross-reference index.
    #[serde(default)]
    pub contact_serial_column: Option<String>,
    /// Contact timestamp column; entities carrying both this and a contact
    /// serial feed the contact chronology.
    #[serde(default)]
    pub contact_date_column: Option<String>,
    /// Order id identity for the cross-reference index.
    #[serde(default)]
    pub order_id_column: Option<String>,
    #[serde(default)]
    pub children: Vec<ChildSpec>,
    #[serde(default)]
    pub derived: Vec<DerivedField>,
}

/// Parent→child order link resolution (two-hop cross-reference).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderChainConfig {
    pub link_table: String,
    pub parent_column: String,
    pub child_column: String,
    pub result_table: String,
    pub result_order_column: String,
}

/// One patient-level attribute observed once per recording contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistorySource {
    /// Attribute name (e.g. "smoking_status").
    pub name: String,
    pub table: String,
    pub subject_column: String,
    pub value_column: String,
    /// Contact during which the fact was recorded.
    pub contact_column: String,
    /// Contact during which it was reviewed, when different.
    #[serde(default)]
    pub reviewed_contact_column: Option<String>,
    /// Source-declared observation timestamp.
    pub timestamp_column: String,
    /// Declared tie-break for same-timestamp snapshots.
    #[serde(default)]
    pub sequence_column: Option<String>,
}

/// The whole run configuration: immutable, loaded once at startup, passed
/// explicitly into every component that needs it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HydrationConfig {
    #[serde(default)]
    pub split_groups: Vec<SplitGroup>,
    #[serde(default)]
    pub entities: Vec<EntityMapping>,
    #[serde(default)]
    pub order_chain: Option<OrderChainConfig>,
    #[serde(default)]
    pub history: Vec<HistorySource>,
    #[serde(default)]
    pub manifests: Vec<ColumnManifest>,
}

impl HydrationConfig {
    pub fn split_group_for(&self, base_table: &str) -> Option<&SplitGroup> {
        self.split_groups
            .iter()
            .find(|group| group.base_table == base_table)
    }

    pub fn entity(&self, name: &str) -> Option<&EntityMapping> {
        self.entities.iter().find(|entity| entity.name == name)
    }

    pub fn manifest_for(&self, entity: &str) -> Option<&ColumnManifest> {
        self.manifests
            .iter()
            .find(|manifest| manifest.entity == entity)
    }

    pub fn history_source(&self, name: &str) -> Option<&HistorySource> {
        self.history.iter().find(|source| source.name == name)
    }
}
