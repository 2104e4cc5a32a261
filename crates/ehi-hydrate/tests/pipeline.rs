use std::collections::BTreeSet;

use ehi_hydrate::{XrefView, hydrate_subject, subject_document};
use ehi_model::{
    Cardinality, ChildSpec, ColumnManifest, DerivedField, EngineError, EntityMapping,
    HydrationConfig, PhysicalTable, SplitGroup, SplitMember, Value,
};
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

fn patient_split_group() -> SplitGroup {
    SplitGroup {
        base_table: "PATIENT".to_string(),
        base_pk_column: "PAT_ID".to_string(),
        members: vec![
            SplitMember {
                table: "PATIENT_2".to_string(),
                join_column: "PAT_ID_2".to_string(),
            },
            SplitMember {
                table: "PATIENT_3".to_string(),
                join_column: "PATIENT_ID".to_string(),
            },
        ],
    }
}

fn store() -> TableStore {
    let mut store = TableStore::new();
    store.insert(table(
        "PATIENT",
        &["PAT_ID", "PAT_NAME", "BIRTH_DATE"],
        &[&["Z100", "TEST,PATIENT", "1980-02-03"]],
    ));
    store.insert(table(
        "PATIENT_2",
        &["PAT_ID_2", "ETHNIC_GROUP_C"],
        &[&["Z100", "14"]],
    ));
    // PATIENT_3 carries a colliding PAT_NAME spelling; the base must win.
    store.insert(table(
        "PATIENT_3",
        &["PATIENT_ID", "PAT_NAME", "LANGUAGE_C"],
        &[&["Z100", "SHOULD NOT WIN", "22"]],
    ));
    store.insert(table(
        "PAT_ENC",
        &["PAT_ID", "PAT_ENC_CSN_ID", "CONTACT_DATE", "DEPARTMENT_ID"],
        &[
            &["Z100", "724001", "2020-01-01", "8"],
            &["Z100", "724002", "2022-05-01", "8"],
            &["Z999", "724900", "2021-07-14", "9"],
        ],
    ));
    store.insert(table(
        "PAT_ENC_DX",
        &["PAT_ENC_CSN_ID", "DX_ID", "LINE"],
        &[
            &["724001", "5501", "1"],
            &["724001", "5502", "2"],
            &["724900", "5503", "1"],
            // Edit left behind after its parent encounter was removed.
            &["999999", "5504", "1"],
        ],
    ));
    store.insert(table(
        "HSP_ACCOUNT",
        &["HSP_ACCOUNT_ID", "PAT_ID", "PRIM_ENC_CSN_ID", "TOT_CHGS"],
        &[&["30001", "Z100", "724002", "1250.00"]],
    ));
    store.insert(table(
        "CLARITY_DEP",
        &["DEPARTMENT_ID", "DEPARTMENT_NAME"],
        &[&["8", "CARDIOLOGY"], &["9", "DERMATOLOGY"]],
    ));
    store
}

fn config() -> HydrationConfig {
    HydrationConfig {
        split_groups: vec![patient_split_group()],
        entities: vec![
            EntityMapping {
                name: "patients".to_string(),
                base_table: "PATIENT".to_string(),
                id_column: "PAT_ID".to_string(),
                subject_column: "PAT_ID".to_string(),
                contact_serial_column: None,
                contact_date_column: None,
                order_id_column: None,
                children: Vec::new(),
                derived: Vec::new(),
            },
            EntityMapping {
                name: "encounters".to_string(),
                base_table: "PAT_ENC".to_string(),
                id_column: "PAT_ENC_CSN_ID".to_string(),
                subject_column: "PAT_ID".to_string(),
                contact_serial_column: Some("PAT_ENC_CSN_ID".to_string()),
                contact_date_column: Some("CONTACT_DATE".to_string()),
                order_id_column: None,
                children: vec![ChildSpec {
                    source_table: "PAT_ENC_DX".to_string(),
                    foreign_key_column: "PAT_ENC_CSN_ID".to_string(),
                    attachment_key: "diagnoses".to_string(),
                    cardinality: Cardinality::Many,
                    sort_column: Some("LINE".to_string()),
                }],
                derived: vec![DerivedField {
                    name: "department_name".to_string(),
                    source_column: "DEPARTMENT_ID".to_string(),
                    lookup_table: "CLARITY_DEP".to_string(),
                    lookup_id_column: "DEPARTMENT_ID".to_string(),
                    lookup_name_column: "DEPARTMENT_NAME".to_string(),
                }],
            },
            EntityMapping {
                name: "billing".to_string(),
                base_table: "HSP_ACCOUNT".to_string(),
                id_column: "HSP_ACCOUNT_ID".to_string(),
                subject_column: "PAT_ID".to_string(),
                contact_serial_column: Some("PRIM_ENC_CSN_ID".to_string()),
                contact_date_column: None,
                order_id_column: None,
                children: Vec::new(),
                derived: Vec::new(),
            },
        ],
        ..HydrationConfig::default()
    }
}

#[test]
fn split_merge_unions_columns_and_base_wins_collisions() {
    let store = store();
    let hydration = hydrate_subject(&store, &config(), "Z100").expect("hydrate");
    let patients = hydration.graph.collection("patients");
    assert_eq!(patients.len(), 1);
    let patient = &patients[0];

    let expected: BTreeSet<&str> = [
        "PAT_ID",
        "PAT_NAME",
        "BIRTH_DATE",
        "ETHNIC_GROUP_C",
        "LANGUAGE_C",
    ]
    .into();
    let actual: BTreeSet<&str> = patient
        .record
        .columns
        .iter()
        .map(String::as_str)
        .collect();
    assert_eq!(actual, expected);

    assert_eq!(
        patient.scalar("PAT_NAME").expect("base column").as_str(),
        Some("TEST,PATIENT")
    );
    assert_eq!(
        patient.scalar("LANGUAGE_C").expect("split column").as_str(),
        Some("22")
    );
    assert!(hydration.report.split_conflicts.is_empty());
}

#[test]
fn children_attach_in_sort_order_and_filter_by_subject() {
    let store = store();
    let hydration = hydrate_subject(&store, &config(), "Z100").expect("hydrate");
    let encounters = hydration.graph.collection("encounters");
    assert_eq!(encounters.len(), 2);

    let first = &encounters[0];
    assert_eq!(first.id, "724001");
    let diagnoses = first.children("diagnoses");
    assert_eq!(diagnoses.len(), 2);
    assert_eq!(diagnoses[0].get("DX_ID").and_then(Value::as_str), Some("5501"));
    assert_eq!(diagnoses[1].get("DX_ID").and_then(Value::as_str), Some("5502"));

    // Another subject's diagnosis rows never leak in and are not orphans;
    // only the row pointing at the removed encounter counts.
    assert_eq!(hydration.report.join_orphans.get("PAT_ENC_DX"), Some(&1u64));

    assert_eq!(
        first.scalar("department_name").expect("derived").as_str(),
        Some("CARDIOLOGY")
    );
}

#[test]
fn absent_child_table_yields_empty_list_never_null() {
    let mut store = store();
    let mut config = config();
    // Point the child spec at a table this export does not carry.
    config.entities[1].children[0].source_table = "PAT_ENC_RSN".to_string();
    store.insert(table("UNRELATED", &["X"], &[]));

    let hydration = hydrate_subject(&store, &config, "Z100").expect("hydrate");
    let encounter = &hydration.graph.collection("encounters")[0];
    assert!(encounter.children("diagnoses").is_empty());
    assert!(hydration.report.missing_tables.contains("PAT_ENC_RSN"));
}

#[test]
fn cross_references_resolve_both_directions_after_the_barrier() {
    let store = store();
    let hydration = hydrate_subject(&store, &config(), "Z100").expect("hydrate");
    let view = XrefView::new(&hydration.graph, &hydration.index);

    let encounters = hydration.graph.collection("encounters");
    let billed = &encounters[1];
    let unbilled = &encounters[0];

    let billing = view.billing_visit(billed).expect("billed encounter resolves");
    assert_eq!(billing.id, "30001");
    assert!(view.billing_visit(unbilled).is_none());

    let back = view.encounter_of(billing).expect("reverse lookup");
    assert_eq!(back.id, "724002");
}

#[test]
fn cardinality_one_without_tie_break_is_ambiguous() {
    let store = store();
    let mut config = config();
    config.entities[1].children[0] = ChildSpec {
        source_table: "PAT_ENC_DX".to_string(),
        foreign_key_column: "PAT_ENC_CSN_ID".to_string(),
        attachment_key: "primary_diagnosis".to_string(),
        cardinality: Cardinality::One,
        sort_column: None,
    };
    let error = hydrate_subject(&store, &config, "Z100").expect_err("two rows, no tie-break");
    assert!(matches!(error, EngineError::AmbiguousOrdering { .. }));

    config.entities[1].children[0].sort_column = Some("LINE".to_string());
    let hydration = hydrate_subject(&store, &config, "Z100").expect("tie-break declared");
    let encounter = &hydration.graph.collection("encounters")[0];
    let primary = encounter.children("primary_diagnosis");
    assert_eq!(primary.len(), 1);
    assert_eq!(primary[0].get("DX_ID").and_then(Value::as_str), Some("5501"));
}

#[test]
fn attachment_key_colliding_with_source_column_is_a_defect() {
    let store = store();
    let mut config = config();
    config.entities[1].children[0].attachment_key = "DEPARTMENT_ID".to_string();
    let error = hydrate_subject(&store, &config, "Z100").expect_err("collision");
    assert!(matches!(error, EngineError::InvalidMapping { .. }));
}

#[test]
fn misspelled_identity_column_fails_with_alternatives() {
    let store = store();
    let mut config = config();
    config.entities[1].id_column = "pat_enc_csn_id".to_string();
    let error = hydrate_subject(&store, &config, "Z100").expect_err("undeclared column");
    let message = error.to_string();
    assert!(message.contains("PAT_ENC"));
    assert!(message.contains("did you mean \"PAT_ENC_CSN_ID\"?"));
}

#[test]
fn hydration_is_deterministic_across_runs() {
    let store = store();
    let mut config = config();
    config.manifests = vec![ColumnManifest {
        entity: "encounters".to_string(),
        table: "PAT_ENC".to_string(),
        mapped: vec![
            "PAT_ENC_CSN_ID".to_string(),
            "CONTACT_DATE".to_string(),
            "DEPARTMENT_ID".to_string(),
        ],
        skipped: vec!["PAT_ID".to_string()],
    }];

    let first = hydrate_subject(&store, &config, "Z100").expect("first run");
    let second = hydrate_subject(&store, &config, "Z100").expect("second run");
    let first_doc = subject_document(&store, &config, None, &first).expect("document");
    let second_doc = subject_document(&store, &config, None, &second).expect("document");
    assert_eq!(
        serde_json::to_string(&first_doc).expect("serialize"),
        serde_json::to_string(&second_doc).expect("serialize")
    );

    // Mapped fields project; skipped columns remain visible only in raw.
    let encounter = &first_doc["collections"]["encounters"][0];
    assert!(encounter["fields"].get("PAT_ID").is_none());
    assert_eq!(encounter["raw"]["PAT_ID"], serde_json::json!("Z100"));
    assert_eq!(encounter["children"]["diagnoses"].as_array().map(Vec::len), Some(2));
}
