use std::fs;

use ehi_store::{SchemaCatalog, TableStore, lookup_name};

#[test]
fn loads_directory_and_probes_tables() {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(
        dir.path().join("PATIENT.tsv"),
        "PAT_ID\tPAT_NAME\nZ100\tTEST,PATIENT\n",
    )
    .expect("write PATIENT");
    fs::write(
        dir.path().join("CLARITY_DEP.tsv"),
        "DEPARTMENT_ID\tDEPARTMENT_NAME\n8\tCARDIOLOGY\n9\t\n",
    )
    .expect("write CLARITY_DEP");

    let store = TableStore::load_dir(dir.path()).expect("load export");
    assert_eq!(store.len(), 2);
    let patient = store.table("PATIENT").expect("PATIENT present");
    assert_eq!(patient.columns(), ["PAT_ID", "PAT_NAME"]);
    assert_eq!(patient.row_count(), 1);
    assert!(store.table("PAT_ENC").is_none());
}

#[test]
fn lookup_name_never_raises() {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(
        dir.path().join("CLARITY_DEP.tsv"),
        "DEPARTMENT_ID\tDEPARTMENT_NAME\n8\tCARDIOLOGY\n9\t\n",
    )
    .expect("write CLARITY_DEP");
    let store = TableStore::load_dir(dir.path()).expect("load export");

    assert_eq!(
        lookup_name(&store, "CLARITY_DEP", "DEPARTMENT_ID", "DEPARTMENT_NAME", "8"),
        Some("CARDIOLOGY".to_string())
    );
    // Name cell missing.
    assert_eq!(
        lookup_name(&store, "CLARITY_DEP", "DEPARTMENT_ID", "DEPARTMENT_NAME", "9"),
        None
    );
    // Unmatched id, unloaded table, undeclared column.
    assert_eq!(
        lookup_name(&store, "CLARITY_DEP", "DEPARTMENT_ID", "DEPARTMENT_NAME", "77"),
        None
    );
    assert_eq!(lookup_name(&store, "CLARITY_SER", "ID", "NAME", "8"), None);
    assert_eq!(
        lookup_name(&store, "CLARITY_DEP", "DEP_ID", "DEPARTMENT_NAME", "8"),
        None
    );
}

#[test]
fn csv_files_load_with_comma_delimiter() {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(dir.path().join("ZC_SEX.csv"), "SEX_C,NAME\n1,Female\n2,Male\n")
        .expect("write ZC_SEX");
    let store = TableStore::load_dir(dir.path()).expect("load export");
    assert_eq!(
        lookup_name(&store, "ZC_SEX", "SEX_C", "NAME", "2"),
        Some("Male".to_string())
    );
}

#[test]
fn schema_catalog_parses_types() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("schema.json");
    fs::write(
        &path,
        r#"[
            {
                "table": "ORDER_RESULTS",
                "columns": [
                    {"name": "ORDER_ID", "data_type": "integer"},
                    {"name": "ORD_NUM_VALUE", "data_type": "numeric"},
                    {"name": "COMPONENT_NAME"},
                    {"name": "RESULT_TIME", "data_type": "datetime"}
                ]
            }
        ]"#,
    )
    .expect("write schema");

    let catalog = SchemaCatalog::from_path(&path).expect("parse catalog");
    let schema = catalog.table("ORDER_RESULTS").expect("table schema");
    assert!(schema.has_column("ORD_NUM_VALUE"));
    let ord_num = catalog
        .column_type("ORDER_RESULTS", "ORD_NUM_VALUE")
        .expect("column type");
    assert!(ord_num.is_numeric());
    assert!(
        !catalog
            .column_type("ORDER_RESULTS", "COMPONENT_NAME")
            .expect("default type")
            .is_numeric()
    );
    assert!(catalog.table("UNKNOWN").is_none());
}
