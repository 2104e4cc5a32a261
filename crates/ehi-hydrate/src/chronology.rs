//! Contact chronology.
//!
//! "As of encounter" is a chronology lookup, not an id match: the target
//! contact's timestamp positions it on the subject's timeline. The map is
//! built from hydrated collections that carry both a contact serial and a
//! contact timestamp.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::entity::SubjectGraph;

#[derive(Debug, Clone, Default)]
pub struct ContactChronology {
    positions: BTreeMap<String, NaiveDateTime>,
}

impl ContactChronology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a contact's position. The earliest timestamp wins if a serial
    /// somehow appears twice across collections.
    pub fn insert(&mut self, serial: impl Into<String>, at: NaiveDateTime) {
        let serial = serial.into();
        match self.positions.get(&serial) {
            Some(existing) if *existing <= at => {}
            _ => {
                self.positions.insert(serial, at);
            }
        }
    }

    pub fn position(&self, serial: &str) -> Option<NaiveDateTime> {
        self.positions.get(serial).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Gather positions from every hydrated entity that knows both its
    /// contact serial and its contact timestamp.
    pub fn from_graph(graph: &SubjectGraph) -> Self {
        let mut chronology = Self::new();
        for (_, _, entity) in graph.entities() {
            let (Some(serial), Some(at)) = (entity.contact_serial.as_deref(), entity.contact_time)
            else {
                continue;
            };
            chronology.insert(serial, at);
        }
        chronology
    }
}
