//! Schema Model
//!
//! In-memory form of the component schema document:
//!
//! ```text
//! { <ComponentType>: {
//!     "attributes":    { <name>: { "type_data": <text>, "description": <text> } },
//!     "subcomponents": { <ComponentType>: <same shape> } } }
//! ```
//!
//! The model is read-only once loaded and can be shared freely between
//! threads.

use crate::config::{ConfigError, MdlConfig};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use thiserror::Error;

/// Failure to load a schema document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("failed to read schema {path}: {message}")]
    Io { path: String, message: String },

    #[error("schema is not valid JSON at line {line}, column {column}: {message}")]
    Json {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("schema JSON does not describe a component tree: {message}")]
    Shape { message: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            serde_json::error::Category::Data => SchemaError::Shape {
                message: err.to_string(),
            },
            _ => SchemaError::Json {
                message: err.to_string(),
                line: err.line(),
                column: err.column(),
            },
        }
    }
}

/// Result type for schema loading.
pub type SchemaResult<T> = Result<T, SchemaError>;

// ============================================================================
// SCHEMA TYPES
// ============================================================================

/// Schema entry for one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSchema {
    /// Free-text type descriptor, e.g. `Type : String Maximum length : 40`.
    pub type_data: String,
    #[serde(default)]
    pub description: String,
}

/// Allowed attributes and subcomponent types of one component type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaNode {
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeSchema>,
    #[serde(default)]
    pub subcomponents: BTreeMap<String, SchemaNode>,
}

impl SchemaNode {
    pub fn attribute(&self, name: &str) -> Option<&AttributeSchema> {
        self.attributes.get(name)
    }

    pub fn subcomponent(&self, type_name: &str) -> Option<&SchemaNode> {
        self.subcomponents.get(type_name)
    }

    pub fn attribute_names(&self) -> Vec<String> {
        self.attributes.keys().cloned().collect()
    }

    pub fn subcomponent_names(&self) -> Vec<String> {
        self.subcomponents.keys().cloned().collect()
    }

    fn collect_types(&self, into: &mut BTreeSet<String>) {
        for (name, child) in &self.subcomponents {
            into.insert(name.clone());
            child.collect_types(into);
        }
    }
}

/// The whole schema: top-level component types and everything below them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaModel {
    components: BTreeMap<String, SchemaNode>,
    known_types: BTreeSet<String>,
}

static GLOBAL_SCHEMA: OnceCell<SchemaModel> = OnceCell::new();

impl SchemaModel {
    pub fn new(components: BTreeMap<String, SchemaNode>) -> Self {
        let mut known_types = BTreeSet::new();
        for (name, node) in &components {
            known_types.insert(name.clone());
            node.collect_types(&mut known_types);
        }

        tracing::debug!(
            top_level = components.len(),
            known_types = known_types.len(),
            "loaded MDL schema"
        );

        Self {
            components,
            known_types,
        }
    }

    pub fn from_json_str(json: &str) -> SchemaResult<Self> {
        let components: BTreeMap<String, SchemaNode> = serde_json::from_str(json)?;
        Ok(Self::new(components))
    }

    pub fn from_value(value: serde_json::Value) -> SchemaResult<Self> {
        let components: BTreeMap<String, SchemaNode> = serde_json::from_value(value)?;
        Ok(Self::new(components))
    }

    pub fn from_path(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| SchemaError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&json)
    }

    /// The process-wide schema named by `MDL_SCHEMA_PATH`, loaded on first
    /// use.
    pub fn global() -> SchemaResult<&'static SchemaModel> {
        GLOBAL_SCHEMA.get_or_try_init(|| {
            let config = MdlConfig::from_env()?;
            let path = config.require_schema_path()?;
            tracing::info!(path = %path.display(), "loading global MDL schema");
            Self::from_path(path)
        })
    }

    /// Top-level lookup.
    pub fn get(&self, type_name: &str) -> Option<&SchemaNode> {
        self.components.get(type_name)
    }

    pub fn top_level_names(&self) -> Vec<String> {
        self.components.keys().cloned().collect()
    }

    /// Whether `type_name` names a component type at any depth.
    pub fn is_known_type(&self, type_name: &str) -> bool {
        self.known_types.contains(type_name)
    }

    pub fn known_types(&self) -> &BTreeSet<String> {
        &self.known_types
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
