use ehi_hydrate::OrderChainResolver;
use ehi_model::{OrderChainConfig, PhysicalTable, Value};
use ehi_store::TableStore;

fn table(name: &str, columns: &[&str], rows: &[&[&str]]) -> PhysicalTable {
    let mut table = PhysicalTable::new(
        name,
        columns.iter().map(|column| column.to_string()).collect(),
    )
    .expect("table");
    for row in rows {
        table.push_row(row.iter().map(|cell| Value::from_cell(cell)).collect());
    }
    table
}

fn chain_config() -> OrderChainConfig {
    OrderChainConfig {
        link_table: "ORDER_INSTANTIATED".to_string(),
        parent_column: "PARENT_ORDER_ID".to_string(),
        child_column: "ORDER_ID".to_string(),
        result_table: "ORDER_RESULTS".to_string(),
        result_order_column: "ORDER_ID".to_string(),
    }
}

fn lipid_panel_store() -> TableStore {
    let mut store = TableStore::new();
    // Parent order 945468368 ("LIPID PANEL") has no direct result rows;
    // the instantiated child 945468371 carries all five components. The
    // link table also carries the degenerate self-link the source system
    // writes for standalone orders.
    store.insert(table(
        "ORDER_INSTANTIATED",
        &["PARENT_ORDER_ID", "ORDER_ID"],
        &[
            &["945468368", "945468368"],
            &["945468368", "945468371"],
        ],
    ));
    store.insert(table(
        "ORDER_RESULTS",
        &["ORDER_ID", "COMPONENT_NAME", "ORD_VALUE"],
        &[
            &["945468371", "CHOLESTEROL", "159"],
            &["945468371", "HDL", "62"],
            &["945468371", "LDL", "84"],
            &["945468371", "TRIG", "67"],
            &["945468371", "VLDL", "13"],
        ],
    ));
    store
}

#[test]
fn parent_without_direct_results_walks_one_hop() {
    let store = lipid_panel_store();
    let config = chain_config();
    let resolver = OrderChainResolver::new(&store, &config);

    let results = resolver.all_results("945468368");
    assert_eq!(results.len(), 5);
    assert!(results.iter().all(|result| result.order_id == "945468371"));
    let components: Vec<&str> = results
        .iter()
        .filter_map(|result| result.record.get("COMPONENT_NAME"))
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(components, ["CHOLESTEROL", "HDL", "LDL", "TRIG", "VLDL"]);
    let values: Vec<&str> = results
        .iter()
        .filter_map(|result| result.record.get("ORD_VALUE"))
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(values, ["159", "62", "84", "67", "13"]);
}

#[test]
fn direct_results_short_circuit_the_chain() {
    let mut store = lipid_panel_store();
    // Give the parent its own single result row; the chain must not walk.
    store.insert(table(
        "ORDER_RESULTS",
        &["ORDER_ID", "COMPONENT_NAME", "ORD_VALUE"],
        &[
            &["945468368", "HGBA1C", "5.4"],
            &["945468371", "CHOLESTEROL", "159"],
        ],
    ));
    let config = chain_config();
    let resolver = OrderChainResolver::new(&store, &config);

    let results = resolver.all_results("945468368");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].order_id, "945468368");
    assert_eq!(
        results[0].record.get("COMPONENT_NAME").and_then(Value::as_str),
        Some("HGBA1C")
    );
}

#[test]
fn missing_tables_resolve_to_no_results() {
    let store = TableStore::new();
    let config = chain_config();
    let resolver = OrderChainResolver::new(&store, &config);
    assert!(resolver.all_results("945468368").is_empty());
}

#[test]
fn cyclic_link_tables_terminate() {
    let mut store = TableStore::new();
    store.insert(table(
        "ORDER_INSTANTIATED",
        &["PARENT_ORDER_ID", "ORDER_ID"],
        &[
            &["1", "2"],
            &["2", "3"],
            &["3", "1"],
        ],
    ));
    store.insert(table(
        "ORDER_RESULTS",
        &["ORDER_ID", "COMPONENT_NAME", "ORD_VALUE"],
        &[],
    ));
    let config = chain_config();
    let resolver = OrderChainResolver::new(&store, &config);
    // A corrupt cycle with no results anywhere must come back empty
    // instead of recursing unboundedly.
    assert!(resolver.all_results("1").is_empty());
}

#[test]
fn grandparent_chains_resolve_through_two_hops() {
    let mut store = TableStore::new();
    store.insert(table(
        "ORDER_INSTANTIATED",
        &["PARENT_ORDER_ID", "ORDER_ID"],
        &[&["10", "20"], &["20", "30"]],
    ));
    store.insert(table(
        "ORDER_RESULTS",
        &["ORDER_ID", "COMPONENT_NAME", "ORD_VALUE"],
        &[&["30", "SODIUM", "140"]],
    ));
    let config = chain_config();
    let resolver = OrderChainResolver::new(&store, &config);
    let results = resolver.all_results("10");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].order_id, "30");
}
