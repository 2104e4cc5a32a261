use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("export directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("failed to read directory {path}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read table file {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to read schema catalog {path}")]
    ReadSchema {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse schema catalog {path}")]
    ParseSchema {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Model(#[from] ehi_model::EngineError),
}

pub type Result<T> = std::result::Result<T, StoreError>;
