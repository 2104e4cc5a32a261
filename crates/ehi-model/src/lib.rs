pub mod config;
pub mod error;
pub mod lookup;
pub mod manifest;
pub mod report;
pub mod table;
pub mod value;

pub use config::{
    Cardinality, ChildSpec, DerivedField, EntityMapping, HistorySource, HydrationConfig,
    OrderChainConfig, SplitGroup, SplitMember,
};
pub use error::{EngineError, Result};
pub use lookup::CaseInsensitiveSet;
pub use manifest::ColumnManifest;
pub use report::HydrationReport;
pub use table::{PhysicalTable, Record};
pub use value::{Value, format_numeric};
