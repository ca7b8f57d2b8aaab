//! Schema loading
//!
//! Two shapes are accepted:
//! - a bare JSON array of layouts (legacy)
//! - an object with `layouts` and optional `globalAttributes`
//!
//! Loading never fails past [`load`]: a missing or malformed file degrades
//! to an empty schema, which simply disables suggestions.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{AttributeEntry, LayoutEntry, Schema};

/// Errors raised while reading a schema file.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read schema {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("schema is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load the schema at `path`, logging and returning an empty schema on failure.
pub fn load(path: &Path) -> Schema {
    match try_load(path) {
        Ok(schema) => {
            info!(
                "Loaded {} layouts and {} global attributes from {:?}",
                schema.layouts.len(),
                schema.global_attributes.len(),
                path
            );
            schema
        }
        Err(e) => {
            warn!("Layout suggestions disabled: {}", e);
            Schema::empty()
        }
    }
}

/// Read and decode the schema at `path`.
pub fn try_load(path: &Path) -> Result<Schema, SchemaError> {
    let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Schema::from_json_str(&text)
}

impl Schema {
    /// Parse schema text. Only invalid JSON is an error; unexpected shapes
    /// normalize to empty sections.
    pub fn from_json_str(text: &str) -> Result<Schema, SchemaError> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Schema::from_value(value))
    }

    pub fn from_value(value: Value) -> Schema {
        match value {
            Value::Array(layouts) => Schema {
                global_attributes: Vec::new(),
                layouts: decode_layouts(layouts),
            },
            Value::Object(mut fields) => {
                let layouts = match fields.remove("layouts") {
                    Some(Value::Array(layouts)) => decode_layouts(layouts),
                    Some(other) => {
                        debug!("Ignoring non-array `layouts` field: {}", other);
                        Vec::new()
                    }
                    None => Vec::new(),
                };
                let global_attributes = match fields.remove("globalAttributes") {
                    Some(Value::Array(entries)) => {
                        entries.into_iter().map(AttributeEntry::from_value).collect()
                    }
                    _ => Vec::new(),
                };
                Schema { global_attributes, layouts }
            }
            other => {
                warn!("Schema root is neither an array nor an object: {}", other);
                Schema::empty()
            }
        }
    }
}

fn decode_layouts(values: Vec<Value>) -> Vec<LayoutEntry> {
    let mut seen = HashSet::new();
    let mut layouts = Vec::with_capacity(values.len());

    for (index, value) in values.into_iter().enumerate() {
        let layout = match serde_json::from_value::<LayoutEntry>(value) {
            Ok(layout) => layout,
            Err(e) => {
                warn!("Skipping layout #{}: {}", index, e);
                continue;
            }
        };
        if !seen.insert(layout.name.clone()) {
            warn!("Skipping duplicate layout '{}' (#{})", layout.name, index);
            continue;
        }
        layouts.push(layout);
    }

    layouts
}
