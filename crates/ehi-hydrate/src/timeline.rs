//! Versioned snapshot timelines.
//!
//! One patient-level attribute, observed across many distinct recording
//! contacts: each observation is its own contact, not an edit of a prior
//! one. The timeline sorts explicitly before any temporal query: a
//! query's incidental row order is the single most common source of
//! nondeterministic output in this class of system, and never substitutes
//! for the declared timestamp and tie-break.

use chrono::NaiveDateTime;

use ehi_model::{EngineError, Result};

use crate::chronology::ContactChronology;

/// One observation of the attribute: the payload plus its provenance
/// stamps: the recording contact, the contact during which it was
/// reviewed (when different), and the source-declared timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedSnapshot<T> {
    pub value: T,
    pub contact_serial: String,
    pub reviewed_contact_serial: Option<String>,
    pub timestamp: NaiveDateTime,
    /// Declared tie-break (e.g. an insertion sequence). Without it, a
    /// timestamp tie is ambiguous.
    pub sequence: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct HistoryTimeline<T> {
    attribute: String,
    snapshots: Vec<VersionedSnapshot<T>>,
}

impl<T> HistoryTimeline<T> {
    /// Own the snapshots sorted ascending by (timestamp, sequence).
    pub fn new(attribute: impl Into<String>, mut snapshots: Vec<VersionedSnapshot<T>>) -> Self {
        snapshots.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.sequence.cmp(&b.sequence))
        });
        Self {
            attribute: attribute.into(),
            snapshots,
        }
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn snapshots(&self) -> &[VersionedSnapshot<T>] {
        &self.snapshots
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Maximum by (timestamp, declared tie-break). A timestamp tie whose
    /// candidates lack distinct sequences is surfaced as ambiguous, never
    /// resolved by incidental order.
    pub fn latest(&self) -> Result<Option<&VersionedSnapshot<T>>> {
        self.pick_latest(self.snapshots.len(), "latest()")
    }

    /// Most recent snapshot with timestamp at or before `date`.
    pub fn as_of_date(&self, date: NaiveDateTime) -> Result<Option<&VersionedSnapshot<T>>> {
        let eligible = self
            .snapshots
            .partition_point(|snapshot| snapshot.timestamp <= date);
        self.pick_latest(eligible, "as_of_date()")
    }

    /// Most recent snapshot at or before the chronological position of the
    /// target contact. A chronology lookup, not an id match: the contact's
    /// timestamp decides, and an unknown contact is not-found.
    pub fn as_of_encounter(
        &self,
        contact_serial: &str,
        chronology: &ContactChronology,
    ) -> Result<Option<&VersionedSnapshot<T>>> {
        match chronology.position(contact_serial) {
            Some(position) => self.as_of_date(position),
            None => Ok(None),
        }
    }

    /// Winner among the first `eligible` sorted snapshots.
    fn pick_latest(&self, eligible: usize, operation: &str) -> Result<Option<&VersionedSnapshot<T>>> {
        let candidates = &self.snapshots[..eligible];
        let Some(last) = candidates.last() else {
            return Ok(None);
        };
        let tied: Vec<_> = candidates
            .iter()
            .filter(|snapshot| snapshot.timestamp == last.timestamp)
            .collect();
        if tied.len() > 1 {
            // The sort put the highest sequence last; it wins only when
            // every tied candidate carries the declared key and the winner
            // is distinct on it.
            let key_missing = tied.iter().any(|snapshot| snapshot.sequence.is_none());
            let winners = tied
                .iter()
                .filter(|snapshot| snapshot.sequence == last.sequence)
                .count();
            if key_missing || winners > 1 {
                return Err(EngineError::AmbiguousOrdering {
                    context: format!("timeline {} {}", self.attribute, operation),
                    candidates: tied.len(),
                });
            }
        }
        Ok(Some(last))
    }
}
