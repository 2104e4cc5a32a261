pub mod render;

use std::path::Path;

use thiserror::Error;

use ehi_store::SchemaCatalog;

pub use render::{render_module, render_table};

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("failed to write generated module {path}")]
    Write {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Render the catalog and write the generated module to `path`.
pub fn write_module(catalog: &SchemaCatalog, path: &Path) -> Result<(), CodegenError> {
    let source = render_module(catalog);
    std::fs::write(path, source).map_err(|source| CodegenError::Write {
        path: path.to_path_buf(),
        source,
    })
}
