//! Writing the generated module to disk

use crate::render::render_module;
use modelgen_core::TableDefinition;
use std::path::{Path, PathBuf};

/// Extension of the generated file
pub const OUTPUT_EXTENSION: &str = "ts";

/// Errors that can occur when writing generated code
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// `<output_dir>/<schema_name>.ts`
pub fn output_path(output_dir: &Path, schema_name: &str) -> PathBuf {
    output_dir.join(format!("{}.{}", schema_name, OUTPUT_EXTENSION))
}

/// Render `tables` and write them to `<output_dir>/<schema_name>.ts`.
///
/// The module goes to a temporary sibling first and is renamed into place, so
/// a failed write never leaves a partial file behind.
pub fn emit(tables: &[TableDefinition], output_dir: &Path, schema_name: &str) -> Result<PathBuf, EmitError> {
    let module = render_module(tables);

    std::fs::create_dir_all(output_dir).map_err(|source| EmitError::CreateDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let path = output_path(output_dir, schema_name);
    let tmp = output_dir.join(format!(".{}.{}.tmp", schema_name, OUTPUT_EXTENSION));

    let written = std::fs::write(&tmp, module.as_bytes()).and_then(|_| std::fs::rename(&tmp, &path));
    if let Err(source) = written {
        let _ = std::fs::remove_file(&tmp);
        return Err(EmitError::Write { path, source });
    }

    tracing::debug!("Wrote {} tables to {}", tables.len(), path.display());
    Ok(path)
}
