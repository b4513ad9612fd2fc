//! Command implementations
//!
//! Each command returns the text it prints so it can be exercised without
//! spawning the binary.

pub mod eval;
pub mod schema;

use crate::error::{CliError, CliResult};
use std::path::Path;
use tango_types::{Material, Schema};

fn read_file(path: &Path) -> CliResult<String> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.display().to_string(),
        source,
    })
}

/// Read a JSON schema document
pub fn read_schema(path: &Path) -> CliResult<Schema> {
    let schema = serde_json::from_str(&read_file(path)?)?;
    tracing::debug!(path = %path.display(), "Schema read");
    Ok(schema)
}

/// Read a JSON array of materials
pub fn read_materials(path: &Path) -> CliResult<Vec<Material>> {
    Ok(serde_json::from_str(&read_file(path)?)?)
}
