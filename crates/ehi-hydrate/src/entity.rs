//! Hydrated entities and the per-subject graph.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;

use ehi_model::{Cardinality, Record, Result, Value};

use crate::guard::{GuardedRow, undeclared};

static MISSING: Value = Value::Missing;

/// One canonical entity: its merged source row, structural children nested
/// under attachment keys, and synthetic derived fields. Source data and
/// synthetic fields never share a name; the collision check runs before
/// hydration.
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: String,
    pub collection: String,
    pub record: Record,
    children: BTreeMap<String, Vec<Record>>,
    cardinalities: BTreeMap<String, Cardinality>,
    derived: BTreeMap<String, Value>,
    synthetic: BTreeSet<String>,
    pub contact_serial: Option<String>,
    /// Contact timestamp feeding the chronology, when the mapping declares
    /// a contact date column.
    pub contact_time: Option<NaiveDateTime>,
    pub order_id: Option<String>,
}

impl Entity {
    pub fn new(collection: impl Into<String>, id: impl Into<String>, record: Record) -> Self {
        Self {
            id: id.into(),
            collection: collection.into(),
            record,
            children: BTreeMap::new(),
            cardinalities: BTreeMap::new(),
            derived: BTreeMap::new(),
            synthetic: BTreeSet::new(),
            contact_serial: None,
            contact_time: None,
            order_id: None,
        }
    }

    pub fn attach(&mut self, key: &str, cardinality: Cardinality, rows: Vec<Record>) {
        self.synthetic.insert(key.to_string());
        self.cardinalities.insert(key.to_string(), cardinality);
        self.children.insert(key.to_string(), rows);
    }

    pub fn add_derived(&mut self, name: &str, value: Value) {
        self.synthetic.insert(name.to_string());
        self.derived.insert(name.to_string(), value);
    }

    /// Checked scalar access: source columns first, then derived synthetic
    /// fields. Attachment keys are allow-listed (they read as missing here;
    /// use `children`). Anything else is an undeclared-column failure.
    pub fn scalar(&self, name: &str) -> Result<&Value> {
        if let Some(value) = self.record.get(name) {
            return Ok(value);
        }
        if let Some(value) = self.derived.get(name) {
            return Ok(value);
        }
        if self.children.contains_key(name) {
            return Ok(&MISSING);
        }
        Err(undeclared(&self.record, name, Some(&self.synthetic)))
    }

    /// Children under an attachment key. Always a list, never null; an
    /// unknown key reads as empty.
    pub fn children(&self, key: &str) -> &[Record] {
        self.children
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn attachments(&self) -> impl Iterator<Item = (&str, Cardinality, &[Record])> {
        self.children.iter().map(|(key, rows)| {
            let cardinality = self
                .cardinalities
                .get(key)
                .copied()
                .unwrap_or(Cardinality::Many);
            (key.as_str(), cardinality, rows.as_slice())
        })
    }

    pub fn derived_fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.derived.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn guarded(&self) -> GuardedRow<'_> {
        GuardedRow::with_synthetic(&self.record, &self.synthetic)
    }
}

/// The fully hydrated graph for one subject: every collection the
/// configuration names, in a deterministic order.
#[derive(Debug, Clone, Default)]
pub struct SubjectGraph {
    pub subject_id: String,
    pub collections: BTreeMap<String, Vec<Entity>>,
}

impl SubjectGraph {
    pub fn new(subject_id: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            collections: BTreeMap::new(),
        }
    }

    pub fn collection(&self, name: &str) -> &[Entity] {
        self.collections
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn entity_count(&self) -> usize {
        self.collections.values().map(Vec::len).sum()
    }

    /// Every entity with its collection name and position, in collection
    /// order then row order.
    pub fn entities(&self) -> impl Iterator<Item = (&str, usize, &Entity)> {
        self.collections.iter().flat_map(|(name, entities)| {
            entities
                .iter()
                .enumerate()
                .map(move |(position, entity)| (name.as_str(), position, entity))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity() -> Entity {
        let record = Record {
            table: "ORDER_PROC".to_string(),
            columns: vec!["ORDER_ID".to_string(), "DESCRIPTION".to_string()],
            values: vec![
                Value::from_cell("945468368"),
                Value::from_cell("LIPID PANEL"),
            ],
        };
        let mut entity = Entity::new("orders", "945468368", record);
        entity.attach("results", Cardinality::Many, Vec::new());
        entity.add_derived("department_name", Value::Text("LAB".to_string()));
        entity
    }

    #[test]
    fn scalar_reads_source_then_derived() {
        let entity = entity();
        assert_eq!(
            entity.scalar("DESCRIPTION").expect("source column").as_str(),
            Some("LIPID PANEL")
        );
        assert_eq!(
            entity.scalar("department_name").expect("derived").as_str(),
            Some("LAB")
        );
    }

    #[test]
    fn attachment_key_is_exempt_but_not_scalar() {
        let entity = entity();
        assert!(entity.scalar("results").expect("allow-listed").is_missing());
        assert!(entity.children("results").is_empty());
        assert!(entity.children("unknown").is_empty());
    }

    #[test]
    fn unknown_name_fails_with_alternatives() {
        let entity = entity();
        let error = entity.scalar("order_id").expect_err("undeclared");
        assert!(error.to_string().contains("ORDER_ID"));
    }
}
