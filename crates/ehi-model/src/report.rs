use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Recoverable degradations observed during one subject's hydration.
///
/// None of these abort a run. Exports vary across source-system versions,
/// and some orphaning is expected (edits to since-removed parent rows);
/// the contract is that every degradation is visible as a count.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HydrationReport {
    /// Declared tables absent from this export.
    pub missing_tables: BTreeSet<String>,
    /// Tables whose configured join column (split member join or child
    /// foreign key) is absent from the current schema; the join was
    /// treated as absent.
    pub degraded_joins: BTreeSet<String>,
    /// Member table -> rows beyond the first for one join value.
    pub split_conflicts: BTreeMap<String, u64>,
    /// Child table -> rows whose foreign key matched no parent.
    pub join_orphans: BTreeMap<String, u64>,
}

impl HydrationReport {
    pub fn note_missing_table(&mut self, table: &str) {
        self.missing_tables.insert(table.to_string());
    }

    pub fn note_degraded_join(&mut self, table: &str) {
        self.degraded_joins.insert(table.to_string());
    }

    pub fn note_split_conflict(&mut self, table: &str, extra_rows: u64) {
        if extra_rows > 0 {
            *self.split_conflicts.entry(table.to_string()).or_default() += extra_rows;
        }
    }

    pub fn note_join_orphans(&mut self, table: &str, orphans: u64) {
        if orphans > 0 {
            *self.join_orphans.entry(table.to_string()).or_default() += orphans;
        }
    }

    pub fn is_clean(&self) -> bool {
        self.missing_tables.is_empty()
            && self.degraded_joins.is_empty()
            && self.split_conflicts.is_empty()
            && self.join_orphans.is_empty()
    }

    pub fn orphan_total(&self) -> u64 {
        self.join_orphans.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_counts_are_not_recorded() {
        let mut report = HydrationReport::default();
        report.note_join_orphans("ORDER_RESULTS", 0);
        report.note_split_conflict("PATIENT_2", 0);
        assert!(report.is_clean());
        report.note_join_orphans("ORDER_RESULTS", 3);
        assert_eq!(report.orphan_total(), 3);
    }
}
