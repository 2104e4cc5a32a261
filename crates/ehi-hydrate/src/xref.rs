//! Cross-reference indices.
//!
//! Entities with their own identity (contact serial, order id) reference
//! one another without ownership. The index is built in a single barrier
//! step after every collection of a subject hydrates, and never mutated
//! afterward; accessors return not-found rather than raising, because a
//! referenced collection may simply not have been loaded.

use std::collections::BTreeMap;

use crate::entity::{Entity, SubjectGraph};

/// Conventional collection names used by the named accessors.
pub const ENCOUNTERS: &str = "encounters";
pub const BILLING: &str = "billing";

/// Stable handle to one entity in a subject graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRef {
    pub collection: String,
    pub position: usize,
}

pub fn resolve<'a>(graph: &'a SubjectGraph, entity_ref: &EntityRef) -> Option<&'a Entity> {
    graph.collection(&entity_ref.collection).get(entity_ref.position)
}

#[derive(Debug, Default)]
pub struct CrossReferenceIndex {
    by_contact_serial: BTreeMap<String, Vec<EntityRef>>,
    by_order_id: BTreeMap<String, Vec<EntityRef>>,
}

impl CrossReferenceIndex {
    /// The barrier step: index every entity carrying a secondary identity.
    pub fn build(graph: &SubjectGraph) -> Self {
        let mut index = Self::default();
        for (collection, position, entity) in graph.entities() {
            let entity_ref = EntityRef {
                collection: collection.to_string(),
                position,
            };
            if let Some(serial) = entity.contact_serial.as_deref() {
                index
                    .by_contact_serial
                    .entry(serial.to_string())
                    .or_default()
                    .push(entity_ref.clone());
            }
            if let Some(order_id) = entity.order_id.as_deref() {
                index
                    .by_order_id
                    .entry(order_id.to_string())
                    .or_default()
                    .push(entity_ref);
            }
        }
        index
    }

    pub fn contact_refs(&self, serial: &str) -> &[EntityRef] {
        self.by_contact_serial
            .get(serial)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn order_refs(&self, order_id: &str) -> &[EntityRef] {
        self.by_order_id
            .get(order_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Read-only accessor surface over a built index.
#[derive(Debug, Clone, Copy)]
pub struct XrefView<'a> {
    pub graph: &'a SubjectGraph,
    pub index: &'a CrossReferenceIndex,
}

impl<'a> XrefView<'a> {
    pub fn new(graph: &'a SubjectGraph, index: &'a CrossReferenceIndex) -> Self {
        Self { graph, index }
    }

    /// The entity in `collection` sharing `entity`'s contact serial, or
    /// not-found when the collection was never loaded or never matched.
    pub fn related_by_contact(&self, entity: &Entity, collection: &str) -> Option<&'a Entity> {
        let serial = entity.contact_serial.as_deref()?;
        self.index
            .contact_refs(serial)
            .iter()
            .find(|entity_ref| entity_ref.collection == collection)
            .and_then(|entity_ref| resolve(self.graph, entity_ref))
    }

    pub fn related_by_order(&self, entity: &Entity, collection: &str) -> Option<&'a Entity> {
        let order_id = entity.order_id.as_deref()?;
        self.index
            .order_refs(order_id)
            .iter()
            .find(|entity_ref| entity_ref.collection == collection)
            .and_then(|entity_ref| resolve(self.graph, entity_ref))
    }

    /// The unique billing entity for an encounter's contact.
    pub fn billing_visit(&self, encounter: &Entity) -> Option<&'a Entity> {
        self.related_by_contact(encounter, BILLING)
    }

    /// The symmetric reverse: the encounter a billing visit points at.
    pub fn encounter_of(&self, billing: &Entity) -> Option<&'a Entity> {
        self.related_by_contact(billing, ENCOUNTERS)
    }
}
