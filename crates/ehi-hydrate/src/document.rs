//! Document projection.
//!
//! One nested JSON document per subject: canonical ids, typed mapped
//! fields, structural children under their attachment keys, synthetic
//! derived fields, and a raw view of the original source columns for
//! auditability. Projection is pure over the hydrated graph, so two runs
//! over the same export serialize identically.

use serde_json::{Map, Number, json};

use ehi_model::{Cardinality, ColumnManifest, HydrationConfig, Record, Result, Value};
use ehi_store::{ColumnType, SchemaCatalog, TableStore};

use crate::entity::Entity;
use crate::pipeline::{SubjectHydration, build_timeline};

/// Scalar as it appears in the typed `fields` section: numeric where the
/// schema catalog declares it, string otherwise, null for missing.
fn typed_json(value: &Value, column_type: Option<ColumnType>) -> serde_json::Value {
    match value {
        Value::Missing => serde_json::Value::Null,
        Value::Number(number) => Number::from_f64(*number)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Text(text) => {
            if column_type.map(ColumnType::is_numeric).unwrap_or(false) {
                if let Some(number) = value.as_number() {
                    if let Some(number) = Number::from_f64(number) {
                        return serde_json::Value::Number(number);
                    }
                }
            }
            serde_json::Value::String(text.clone())
        }
    }
}

fn raw_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Missing => serde_json::Value::Null,
        other => serde_json::Value::String(other.display_text()),
    }
}

fn record_fields(
    record: &Record,
    catalog: Option<&SchemaCatalog>,
    manifest: Option<&ColumnManifest>,
) -> serde_json::Value {
    let mut fields = Map::new();
    for (column, value) in record.columns.iter().zip(record.values.iter()) {
        if let Some(manifest) = manifest {
            if !manifest.is_mapped(column) {
                continue;
            }
        }
        let column_type = catalog.and_then(|catalog| catalog.column_type(&record.table, column));
        fields.insert(column.clone(), typed_json(value, column_type));
    }
    serde_json::Value::Object(fields)
}

fn record_raw(record: &Record) -> serde_json::Value {
    let mut raw = Map::new();
    for (column, value) in record.columns.iter().zip(record.values.iter()) {
        raw.insert(column.clone(), raw_json(value));
    }
    serde_json::Value::Object(raw)
}

/// Project one entity. Children keep their attachment keys; a
/// one-cardinality match is a single object, and an empty attachment is an
/// empty list for both cardinalities, never null.
pub fn entity_document(
    entity: &Entity,
    catalog: Option<&SchemaCatalog>,
    manifest: Option<&ColumnManifest>,
) -> serde_json::Value {
    let mut doc = Map::new();
    doc.insert("id".to_string(), json!(entity.id));
    doc.insert("table".to_string(), json!(entity.record.table));
    doc.insert(
        "fields".to_string(),
        record_fields(&entity.record, catalog, manifest),
    );

    let mut derived = Map::new();
    for (name, value) in entity.derived_fields() {
        derived.insert(name.to_string(), typed_json(value, None));
    }
    doc.insert("derived".to_string(), serde_json::Value::Object(derived));

    let mut children = Map::new();
    for (key, cardinality, rows) in entity.attachments() {
        let rendered = match cardinality {
            Cardinality::One => match rows.first() {
                Some(row) => record_fields(row, catalog, None),
                None => json!([]),
            },
            Cardinality::Many => serde_json::Value::Array(
                rows.iter()
                    .map(|row| record_fields(row, catalog, None))
                    .collect(),
            ),
        };
        children.insert(key.to_string(), rendered);
    }
    doc.insert("children".to_string(), serde_json::Value::Object(children));

    doc.insert("raw".to_string(), record_raw(&entity.record));
    serde_json::Value::Object(doc)
}

/// Project the whole subject: every collection plus every configured
/// history timeline with its provenance stamps.
pub fn subject_document(
    store: &TableStore,
    config: &HydrationConfig,
    catalog: Option<&SchemaCatalog>,
    hydration: &SubjectHydration,
) -> Result<serde_json::Value> {
    let mut collections = Map::new();
    for (name, entities) in &hydration.graph.collections {
        let manifest = config.manifest_for(name);
        collections.insert(
            name.clone(),
            serde_json::Value::Array(
                entities
                    .iter()
                    .map(|entity| entity_document(entity, catalog, manifest))
                    .collect(),
            ),
        );
    }

    let mut history = Map::new();
    for source in &config.history {
        let timeline = build_timeline(store, source, &hydration.graph.subject_id)?;
        let snapshots: Vec<serde_json::Value> = timeline
            .snapshots()
            .iter()
            .map(|snapshot| {
                json!({
                    "value": typed_json(&snapshot.value, None),
                    "contact_serial": snapshot.contact_serial,
                    "reviewed_contact_serial": snapshot.reviewed_contact_serial,
                    "timestamp": snapshot.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                    "sequence": snapshot.sequence,
                })
            })
            .collect();
        history.insert(source.name.clone(), serde_json::Value::Array(snapshots));
    }

    Ok(json!({
        "subject": hydration.graph.subject_id,
        "collections": serde_json::Value::Object(collections),
        "history": serde_json::Value::Object(history),
    }))
}
