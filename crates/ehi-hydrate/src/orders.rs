//! Order chain resolution.
//!
//! An order and its eventual result data can live on different records,
//! joined through a parent→child order-link table. Only a single hop is
//! contractually required, but the link table cannot be assumed acyclic:
//! the walk carries a visited set and a depth cap.

use std::collections::BTreeSet;

use tracing::warn;

use ehi_model::{OrderChainConfig, Record};
use ehi_store::TableStore;

/// Deep enough for any legitimate grandparent chain; a corrupt link table
/// stops here instead of recursing unboundedly.
const MAX_CHAIN_DEPTH: usize = 8;

/// A result row attributed to the order that owns it, which is not
/// necessarily the order the query started from.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributedResult {
    pub order_id: String,
    pub record: Record,
}

#[derive(Debug, Clone, Copy)]
pub struct OrderChainResolver<'a> {
    store: &'a TableStore,
    config: &'a OrderChainConfig,
}

impl<'a> OrderChainResolver<'a> {
    pub fn new(store: &'a TableStore, config: &'a OrderChainConfig) -> Self {
        Self { store, config }
    }

    /// Every result row reachable from `order_id`: the order's own direct
    /// rows when any exist (the chain is not walked), otherwise the union
    /// of linked child orders' results.
    pub fn all_results(&self, order_id: &str) -> Vec<AttributedResult> {
        let mut visited = BTreeSet::new();
        self.collect(order_id, 0, &mut visited)
    }

    fn collect(
        &self,
        order_id: &str,
        depth: usize,
        visited: &mut BTreeSet<String>,
    ) -> Vec<AttributedResult> {
        if !visited.insert(order_id.to_string()) {
            return Vec::new();
        }
        let direct = self.direct_results(order_id);
        if !direct.is_empty() {
            return direct;
        }
        if depth >= MAX_CHAIN_DEPTH {
            warn!(order_id, depth, "order link chain exceeds depth cap; truncating walk");
            return Vec::new();
        }
        let mut results = Vec::new();
        for child in self.linked_children(order_id) {
            results.extend(self.collect(&child, depth + 1, visited));
        }
        results
    }

    /// Result rows keyed directly to this order. Absent table or column
    /// means no results, never an error.
    pub fn direct_results(&self, order_id: &str) -> Vec<AttributedResult> {
        let Some(table) = self.store.table(&self.config.result_table) else {
            return Vec::new();
        };
        if !table.has_column(&self.config.result_order_column) {
            return Vec::new();
        }
        table
            .rows_where(&self.config.result_order_column, order_id)
            .into_iter()
            .filter_map(|row| table.record(row))
            .map(|record| AttributedResult {
                order_id: order_id.to_string(),
                record,
            })
            .collect()
    }

    /// Child order ids linked under this parent, in physical order,
    /// deduplicated, excluding the degenerate self-link.
    fn linked_children(&self, order_id: &str) -> Vec<String> {
        let Some(table) = self.store.table(&self.config.link_table) else {
            return Vec::new();
        };
        let Some(child_position) = table.column_index(&self.config.child_column) else {
            return Vec::new();
        };
        if !table.has_column(&self.config.parent_column) {
            return Vec::new();
        }
        let mut seen = BTreeSet::new();
        let mut children = Vec::new();
        for row in table.rows_where(&self.config.parent_column, order_id) {
            let Some(cells) = table.row_cells(row) else {
                continue;
            };
            let child = cells[child_position].display_text();
            if child.is_empty() || child == order_id {
                continue;
            }
            if seen.insert(child.clone()) {
                children.push(child);
            }
        }
        children
    }
}
