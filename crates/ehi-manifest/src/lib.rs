pub mod coverage;
pub mod validate;

pub use coverage::{CoverageReport, TableCoverage, TableStatus, build_coverage};
pub use validate::{ManifestValidation, enforce, validate_all, validate_manifest};
