//! Configuration coverage.
//!
//! Enumerates which source tables and columns are, or are not, reachable
//! from the current configuration. Downstream teams read this to decide
//! what to map next; the hydrator reads nothing from it.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use ehi_model::HydrationConfig;
use ehi_store::TableStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    /// Named by configuration and present in this export.
    ConfiguredPresent,
    /// Named by configuration but absent from this export.
    ConfiguredAbsent,
    /// Present in the export but reachable from no configuration.
    PresentUnconfigured,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableCoverage {
    pub table: String,
    pub status: TableStatus,
    /// Columns the configuration (or a manifest) reaches.
    pub reachable_columns: BTreeSet<String>,
    /// Loaded columns nothing reaches.
    pub unreachable_columns: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CoverageReport {
    pub tables: Vec<TableCoverage>,
}

impl CoverageReport {
    pub fn configured_absent(&self) -> impl Iterator<Item = &TableCoverage> {
        self.tables
            .iter()
            .filter(|coverage| coverage.status == TableStatus::ConfiguredAbsent)
    }

    pub fn unconfigured(&self) -> impl Iterator<Item = &TableCoverage> {
        self.tables
            .iter()
            .filter(|coverage| coverage.status == TableStatus::PresentUnconfigured)
    }
}

/// Every (table, column) reference the configuration makes.
fn referenced_columns(config: &HydrationConfig) -> BTreeMap<String, BTreeSet<String>> {
    let mut referenced: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut reach = |table: &str, column: &str| {
        referenced
            .entry(table.to_string())
            .or_default()
            .insert(column.to_string());
    };

    for group in &config.split_groups {
        reach(&group.base_table, &group.base_pk_column);
        for member in &group.members {
            reach(&member.table, &member.join_column);
        }
    }
    for mapping in &config.entities {
        reach(&mapping.base_table, &mapping.id_column);
        reach(&mapping.base_table, &mapping.subject_column);
        for column in [
            mapping.contact_serial_column.as_deref(),
            mapping.contact_date_column.as_deref(),
            mapping.order_id_column.as_deref(),
        ]
        .into_iter()
        .flatten()
        {
            reach(&mapping.base_table, column);
        }
        for spec in &mapping.children {
            reach(&spec.source_table, &spec.foreign_key_column);
            if let Some(sort_column) = spec.sort_column.as_deref() {
                reach(&spec.source_table, sort_column);
            }
        }
        for derived in &mapping.derived {
            reach(&mapping.base_table, &derived.source_column);
            reach(&derived.lookup_table, &derived.lookup_id_column);
            reach(&derived.lookup_table, &derived.lookup_name_column);
        }
    }
    if let Some(chain) = &config.order_chain {
        reach(&chain.link_table, &chain.parent_column);
        reach(&chain.link_table, &chain.child_column);
        reach(&chain.result_table, &chain.result_order_column);
    }
    for source in &config.history {
        reach(&source.table, &source.subject_column);
        reach(&source.table, &source.value_column);
        reach(&source.table, &source.contact_column);
        reach(&source.table, &source.timestamp_column);
        for column in [
            source.reviewed_contact_column.as_deref(),
            source.sequence_column.as_deref(),
        ]
        .into_iter()
        .flatten()
        {
            reach(&source.table, column);
        }
    }
    for manifest in &config.manifests {
        for column in manifest.declared_columns() {
            reach(&manifest.table, column);
        }
        // Splits: manifest classification also reaches member columns of
        // the entity's split group, which live under the member tables.
        if let Some(group) = config.split_group_for(&manifest.table) {
            for member in &group.members {
                for column in manifest.declared_columns() {
                    reach(&member.table, column);
                }
            }
        }
    }

    referenced
}

pub fn build_coverage(store: &TableStore, config: &HydrationConfig) -> CoverageReport {
    let referenced = referenced_columns(config);
    let mut tables = Vec::new();

    for (table, columns) in &referenced {
        match store.table(table) {
            Some(physical) => {
                let loaded: BTreeSet<String> = physical.columns().iter().cloned().collect();
                let reachable: BTreeSet<String> =
                    columns.intersection(&loaded).cloned().collect();
                let unreachable: BTreeSet<String> =
                    loaded.difference(columns).cloned().collect();
                tables.push(TableCoverage {
                    table: table.clone(),
                    status: TableStatus::ConfiguredPresent,
                    reachable_columns: reachable,
                    unreachable_columns: unreachable,
                });
            }
            None => tables.push(TableCoverage {
                table: table.clone(),
                status: TableStatus::ConfiguredAbsent,
                reachable_columns: columns.clone(),
                unreachable_columns: BTreeSet::new(),
            }),
        }
    }

    for name in store.names() {
        if referenced.contains_key(name) {
            continue;
        }
        let physical = store.table(name).expect("listed table");
        tables.push(TableCoverage {
            table: name.to_string(),
            status: TableStatus::PresentUnconfigured,
            reachable_columns: BTreeSet::new(),
            unreachable_columns: physical.columns().iter().cloned().collect(),
        });
    }

    tables.sort_by(|a, b| a.table.cmp(&b.table));
    CoverageReport { tables }
}
