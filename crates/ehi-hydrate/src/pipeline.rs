//! Per-subject hydration.
//!
//! One subject's graph fully hydrates before the next begins: merge the
//! splits, filter to the subject, attach children, resolve derived names,
//! then, as the single barrier, build the cross-reference index and contact
//! chronology over the finished collections.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use ehi_model::{
    DerivedField, EngineError, EntityMapping, HistorySource, HydrationConfig, HydrationReport,
    Result, Value,
};
use ehi_store::{TableStore, lookup_name};

use crate::attach::{count_orphans, select_children};
use crate::chronology::ContactChronology;
use crate::datetime::parse_timestamp;
use crate::entity::{Entity, SubjectGraph};
use crate::guard::undeclared_in;
use crate::merge::{LogicalTable, merge_split_group};
use crate::timeline::{HistoryTimeline, VersionedSnapshot};
use crate::xref::CrossReferenceIndex;

/// Everything one subject's run produces besides documents: the graph, the
/// built index, the contact chronology, and the degradation counters.
#[derive(Debug)]
pub struct SubjectHydration {
    pub graph: SubjectGraph,
    pub index: CrossReferenceIndex,
    pub chronology: ContactChronology,
    pub report: HydrationReport,
}

pub fn hydrate_subject(
    store: &TableStore,
    config: &HydrationConfig,
    subject_id: &str,
) -> Result<SubjectHydration> {
    let mut report = HydrationReport::default();
    let mut graph = SubjectGraph::new(subject_id);

    for mapping in &config.entities {
        let entities = hydrate_collection(store, config, mapping, subject_id, &mut report)?;
        debug!(
            collection = mapping.name.as_str(),
            entities = entities.len(),
            "collection hydrated"
        );
        graph.collections.insert(mapping.name.clone(), entities);
    }

    // Barrier: every collection is hydrated before any cross-reference
    // accessor can run.
    let index = CrossReferenceIndex::build(&graph);
    let chronology = ContactChronology::from_graph(&graph);

    Ok(SubjectHydration {
        graph,
        index,
        chronology,
        report,
    })
}

/// The merged logical view behind a mapping's base table, or `None` when
/// the base table is absent from this export.
pub fn logical_table(
    store: &TableStore,
    config: &HydrationConfig,
    base_table: &str,
    report: &mut HydrationReport,
) -> Result<Option<LogicalTable>> {
    if let Some(group) = config.split_group_for(base_table) {
        return merge_split_group(store, group, report);
    }
    match store.table(base_table) {
        Some(table) => Ok(Some(LogicalTable::from_physical(table))),
        None => {
            report.note_missing_table(base_table);
            Ok(None)
        }
    }
}

fn hydrate_collection(
    store: &TableStore,
    config: &HydrationConfig,
    mapping: &EntityMapping,
    subject_id: &str,
    report: &mut HydrationReport,
) -> Result<Vec<Entity>> {
    let Some(table) = logical_table(store, config, &mapping.base_table, report)? else {
        return Ok(Vec::new());
    };
    validate_mapping(mapping, &table)?;

    // Orphan detection runs against every parent row in the export, not
    // just this subject's: a child row pointing at another subject's
    // parent is not an orphan.
    let all_parent_ids: BTreeSet<String> = table
        .rows
        .iter()
        .filter_map(|record| record.get(&mapping.id_column))
        .filter(|value| !value.is_missing())
        .map(Value::display_text)
        .collect();

    let mut entities = Vec::new();

    for record in table.rows_where(&mapping.subject_column, subject_id) {
        let id = record
            .get(&mapping.id_column)
            .map(Value::display_text)
            .unwrap_or_default();
        if id.is_empty() {
            warn!(
                collection = mapping.name.as_str(),
                table = table.name.as_str(),
                "row lacks canonical id; skipped"
            );
            continue;
        }

        let mut entity = Entity::new(mapping.name.clone(), id.clone(), record.clone());

        if let Some(column) = mapping.contact_serial_column.as_deref() {
            let serial = entity.guarded().text(column)?;
            if !serial.is_empty() {
                entity.contact_serial = Some(serial);
            }
        }
        if let Some(column) = mapping.contact_date_column.as_deref() {
            let raw = entity.guarded().text(column)?;
            entity.contact_time = parse_timestamp(&raw);
        }
        if let Some(column) = mapping.order_id_column.as_deref() {
            let order_id = entity.guarded().text(column)?;
            if !order_id.is_empty() {
                entity.order_id = Some(order_id);
            }
        }

        for spec in &mapping.children {
            match select_children(store, spec, &id)? {
                Some(rows) => entity.attach(&spec.attachment_key, spec.cardinality, rows),
                None => {
                    // Absent table or absent foreign key: empty attachment,
                    // degradation recorded once per spec below.
                    entity.attach(&spec.attachment_key, spec.cardinality, Vec::new());
                }
            }
        }

        for derived in &mapping.derived {
            entity.add_derived(&derived.name, resolve_derived(store, &entity, derived)?);
        }

        entities.push(entity);
    }

    for spec in &mapping.children {
        match store.table(&spec.source_table) {
            None => report.note_missing_table(&spec.source_table),
            Some(child) if !child.has_column(&spec.foreign_key_column) => {
                warn!(
                    table = spec.source_table.as_str(),
                    foreign_key = spec.foreign_key_column.as_str(),
                    "child table lacks configured foreign key; attachments empty"
                );
                report.note_degraded_join(&spec.source_table);
            }
            Some(_) => {
                if let Some(orphans) = count_orphans(store, spec, &all_parent_ids) {
                    report.note_join_orphans(&spec.source_table, orphans);
                }
            }
        }
    }

    Ok(entities)
}

fn resolve_derived(store: &TableStore, entity: &Entity, derived: &DerivedField) -> Result<Value> {
    let id = entity.guarded().text(&derived.source_column)?;
    if id.is_empty() {
        return Ok(Value::Missing);
    }
    let resolved = lookup_name(
        store,
        &derived.lookup_table,
        &derived.lookup_id_column,
        &derived.lookup_name_column,
        &id,
    );
    Ok(match resolved {
        Some(name) => Value::Text(name),
        None => Value::Missing,
    })
}

/// Fail fast on configuration defects: synthetic names must be unique and
/// must never shadow a source column, and the identity columns the mapping
/// names must exist on the logical table.
fn validate_mapping(mapping: &EntityMapping, table: &LogicalTable) -> Result<()> {
    let mut synthetic: BTreeSet<&str> = BTreeSet::new();
    let names = mapping
        .children
        .iter()
        .map(|spec| spec.attachment_key.as_str())
        .chain(mapping.derived.iter().map(|derived| derived.name.as_str()));
    for name in names {
        if !synthetic.insert(name) {
            return Err(EngineError::InvalidMapping {
                entity: mapping.name.clone(),
                message: format!("synthetic field {name:?} is declared twice"),
            });
        }
        if table.columns.iter().any(|column| column == name) {
            return Err(EngineError::InvalidMapping {
                entity: mapping.name.clone(),
                message: format!(
                    "synthetic field {name:?} collides with a source column of {}",
                    table.name
                ),
            });
        }
    }

    for column in [&mapping.id_column, &mapping.subject_column] {
        if !table.columns.iter().any(|candidate| candidate == column) {
            return Err(undeclared_in(&table.name, table.columns.clone(), column));
        }
    }
    Ok(())
}

/// Build the timeline of one history source for one subject. Constructed
/// lazily per requested attribute; an absent history table is an empty
/// timeline.
pub fn build_timeline(
    store: &TableStore,
    source: &HistorySource,
    subject_id: &str,
) -> Result<HistoryTimeline<Value>> {
    let Some(table) = store.table(&source.table) else {
        return Ok(HistoryTimeline::new(source.name.clone(), Vec::new()));
    };

    let mut required = vec![
        source.subject_column.as_str(),
        source.value_column.as_str(),
        source.contact_column.as_str(),
        source.timestamp_column.as_str(),
    ];
    required.extend(source.reviewed_contact_column.as_deref());
    required.extend(source.sequence_column.as_deref());
    for column in required {
        if !table.has_column(column) {
            return Err(undeclared_in(
                &table.name,
                table.columns().to_vec(),
                column,
            ));
        }
    }

    let mut snapshots = Vec::new();
    for row in table.rows_where(&source.subject_column, subject_id) {
        let raw_timestamp = table
            .value(row, &source.timestamp_column)
            .map(Value::display_text)
            .unwrap_or_default();
        let Some(timestamp) = parse_timestamp(&raw_timestamp) else {
            warn!(
                table = source.table.as_str(),
                attribute = source.name.as_str(),
                value = raw_timestamp.as_str(),
                "unparseable snapshot timestamp; row skipped"
            );
            continue;
        };
        let contact_serial = table
            .value(row, &source.contact_column)
            .map(Value::display_text)
            .unwrap_or_default();
        let reviewed_contact_serial = source
            .reviewed_contact_column
            .as_deref()
            .and_then(|column| table.value(row, column))
            .filter(|value| !value.is_missing())
            .map(Value::display_text);
        let sequence = source
            .sequence_column
            .as_deref()
            .and_then(|column| table.value(row, column))
            .and_then(Value::as_number)
            .map(|number| number as i64);
        let value = table
            .value(row, &source.value_column)
            .cloned()
            .unwrap_or(Value::Missing);

        snapshots.push(VersionedSnapshot {
            value,
            contact_serial,
            reviewed_contact_serial,
            timestamp,
            sequence,
        });
    }

    Ok(HistoryTimeline::new(source.name.clone(), snapshots))
}
