use thiserror::Error;

/// Engine error taxonomy.
///
/// Table absence and join orphaning are not errors: they degrade locally and
/// are reported as counters on `HydrationReport`. Everything here aborts the
/// current operation with an actionable message.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(
        "table {} has no column {:?}; columns are [{}]{}",
        .table,
        .column,
        .available.join(", "),
        suggestion_suffix(.suggestion.as_deref())
    )]
    UndeclaredColumn {
        table: String,
        column: String,
        available: Vec<String>,
        suggestion: Option<String>,
    },

    #[error("{context}: {candidates} candidates tie and no tie-break key is declared")]
    AmbiguousOrdering { context: String, candidates: usize },

    #[error(
        "manifest for {} ({}): columns carry data but are classified nowhere: [{}]",
        .entity,
        .table,
        .unclassified.join(", ")
    )]
    ManifestDrift {
        entity: String,
        table: String,
        unclassified: Vec<String>,
    },

    #[error("mapping {entity}: {message}")]
    InvalidMapping { entity: String, message: String },

    #[error("table {table} declares column {column:?} more than once")]
    DuplicateColumn { table: String, column: String },

    #[error("{0}")]
    Message(String),
}

fn suggestion_suffix(suggestion: Option<&str>) -> String {
    match suggestion {
        Some(name) => format!("; did you mean {name:?}?"),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
