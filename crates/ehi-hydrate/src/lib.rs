//! The hydration engine: from flat, split, optionally-present export
//! tables to one nested, typed entity graph per subject.

pub mod attach;
pub mod chronology;
pub mod datetime;
pub mod document;
pub mod entity;
pub mod guard;
pub mod merge;
pub mod orders;
pub mod pipeline;
pub mod timeline;
pub mod xref;

pub use attach::select_children;
pub use chronology::ContactChronology;
pub use datetime::parse_timestamp;
pub use document::{entity_document, subject_document};
pub use entity::{Entity, SubjectGraph};
pub use guard::GuardedRow;
pub use merge::{LogicalTable, merge_split_group};
pub use orders::{AttributedResult, OrderChainResolver};
pub use pipeline::{SubjectHydration, build_timeline, hydrate_subject, logical_table};
pub use timeline::{HistoryTimeline, VersionedSnapshot};
pub use xref::{CrossReferenceIndex, EntityRef, XrefView};
