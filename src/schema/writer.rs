use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::info;

use super::FieldRecord;
use crate::error::{Result, SchemaError};

/// Writes the schema as pretty JSON in one step.
///
/// The document is staged in a temp file next to `path` and renamed over it,
/// so readers never observe a half-written schema.
pub fn write_schema(path: &Path, fields: &[FieldRecord]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|source| SchemaError::io(dir, source))?;

    let content = serde_json::to_string_pretty(fields)?;
    let mut staged = NamedTempFile::new_in(dir).map_err(|source| SchemaError::io(dir, source))?;
    staged
        .write_all(content.as_bytes())
        .and_then(|_| staged.as_file().sync_all())
        .map_err(|source| SchemaError::io(staged.path(), source))?;
    staged
        .persist(path)
        .map_err(|err| SchemaError::io(path, err.error))?;

    info!("schema: wrote {} fields to {}", fields.len(), path.display());
    Ok(())
}

pub fn read_schema(path: &Path) -> Result<Vec<FieldRecord>> {
    let content = fs::read_to_string(path).map_err(|source| SchemaError::io(path, source))?;
    Ok(serde_json::from_str(&content)?)
}
