// crates/model-store-core/src/catalog.rs
// ============================================================================
// Module: Model Type Catalog
// Description: Known model types and their descriptive storage metadata.
// Purpose: Resolve model identifiers to storage keys and document defaults.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The catalog maps a model-type identifier (`llm`, `retriever`, ...) to the
//! metadata needed to store its config document: a display name, a storage
//! prefix, a config file name, and pass-through default fields. The catalog is
//! read-only once built and is injected into the store at construction, so new
//! model types only need a config change.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::keys::CONFIG_ROOT_PREFIX;
use crate::keys::DEFAULT_CONFIG_FILE;
use crate::keys::KeyError;
use crate::keys::config_key;
use crate::keys::validate_segment;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Container image shared by the built-in model types.
const NIM_CONTAINER_IMAGE: &str = "nvcr.io/nvidia/nim:latest";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Catalog lookup and validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The model type is not present in the catalog.
    #[error("unknown model type: {model_type} (available: {})", .available.join(", "))]
    UnknownModelType {
        /// Requested model type.
        model_type: String,
        /// Model types known to the catalog.
        available: Vec<String>,
    },
    /// A catalog entry is malformed.
    #[error("invalid catalog entry {model_type}: {reason}")]
    Invalid {
        /// Offending model type.
        model_type: String,
        /// Validation failure description.
        reason: String,
    },
}

// ============================================================================
// SECTION: Types
// ============================================================================

/// Descriptive metadata for one model type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelTypeEntry {
    /// Human-readable model name, stored as `model_name`.
    pub display_name: String,
    /// Key prefix for the model's config document (e.g. `models/llm/`).
    pub storage_prefix: String,
    /// Config document file name under the prefix.
    #[serde(default = "default_config_file")]
    pub config_file: String,
    /// Optional upstream location of the model.
    #[serde(default)]
    pub source_url: Option<String>,
    /// Pass-through fields merged into every generated document.
    #[serde(default)]
    pub defaults: Map<String, Value>,
}

impl ModelTypeEntry {
    /// Creates an entry stored under `models/<model_type>/model_config.json`.
    #[must_use]
    pub fn new(model_type: &str, display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            storage_prefix: format!("{CONFIG_ROOT_PREFIX}{model_type}/"),
            config_file: default_config_file(),
            source_url: None,
            defaults: Map::new(),
        }
    }

    /// Sets the upstream source URL.
    #[must_use]
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    /// Sets the pass-through default fields.
    #[must_use]
    pub fn with_defaults(mut self, defaults: Map<String, Value>) -> Self {
        self.defaults = defaults;
        self
    }

    /// Returns the object key for this entry's config document.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError`] when the prefix or file name is unsafe.
    pub fn config_key(&self) -> Result<String, KeyError> {
        config_key(&self.storage_prefix, &self.config_file)
    }
}

/// Read-only mapping of model-type identifiers to their metadata.
///
/// # Invariants
/// - Every entry has a valid identifier and a derivable config key.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ModelTypeCatalog {
    /// Entries keyed by model-type identifier.
    entries: BTreeMap<String, ModelTypeEntry>,
}

impl ModelTypeCatalog {
    /// Builds a catalog from entries, validating each one.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Invalid`] when an identifier or key is unsafe.
    pub fn new(entries: BTreeMap<String, ModelTypeEntry>) -> Result<Self, CatalogError> {
        for (model_type, entry) in &entries {
            validate_entry(model_type, entry)?;
        }
        Ok(Self {
            entries,
        })
    }

    /// Returns the built-in catalog (`llm` and `retriever`).
    #[must_use]
    pub fn builtin() -> Self {
        let llm = ModelTypeEntry::new("llm", "Llama-3.1-Nemotron-Nano-8B-v1")
            .with_source_url("https://huggingface.co/nvidia/Llama-3.1-Nemotron-Nano-8B-v1")
            .with_defaults(object(json!({
                "parameters": "8B",
                "architecture": "Transformer",
                "context_length": 4096,
                "precision": "bfloat16",
                "nim_compatible": true,
                "deployment": {
                    "instance_type": "g4dn.xlarge",
                    "gpu_required": true,
                    "gpu_memory": "16GB",
                    "container_image": NIM_CONTAINER_IMAGE,
                },
            })));
        let retriever = ModelTypeEntry::new("retriever", "llama-3_2-nemoretriever-300m-embed-v1")
            .with_source_url(
                "https://build.nvidia.com/nvidia/llama-3_2-nemoretriever-300m-embed-v1",
            )
            .with_defaults(object(json!({
                "parameters": "300M",
                "embedding_dimension": 1024,
                "architecture": "Retriever",
                "max_sequence_length": 2048,
                "nim_compatible": true,
                "deployment": {
                    "instance_type": "cpu",
                    "gpu_required": false,
                    "container_image": NIM_CONTAINER_IMAGE,
                },
            })));
        let mut entries = BTreeMap::new();
        entries.insert("llm".to_string(), llm);
        entries.insert("retriever".to_string(), retriever);
        Self {
            entries,
        }
    }

    /// Returns a copy of this catalog with `other` layered on top.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Invalid`] when an added entry is unsafe.
    pub fn extended(
        &self,
        other: BTreeMap<String, ModelTypeEntry>,
    ) -> Result<Self, CatalogError> {
        let mut entries = self.entries.clone();
        entries.extend(other);
        Self::new(entries)
    }

    /// Looks up a model type.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownModelType`] when the type is not known.
    pub fn resolve(&self, model_type: &str) -> Result<&ModelTypeEntry, CatalogError> {
        self.entries.get(model_type).ok_or_else(|| CatalogError::UnknownModelType {
            model_type: model_type.to_string(),
            available: self.model_types().map(str::to_string).collect(),
        })
    }

    /// Returns true when the model type is known.
    #[must_use]
    pub fn contains(&self, model_type: &str) -> bool {
        self.entries.contains_key(model_type)
    }

    /// Iterates over known model-type identifiers in sorted order.
    pub fn model_types(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Returns the number of known model types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Default config file name used by serde.
fn default_config_file() -> String {
    DEFAULT_CONFIG_FILE.to_string()
}

/// Unwraps a JSON object literal into its map.
fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Validates a single catalog entry.
fn validate_entry(model_type: &str, entry: &ModelTypeEntry) -> Result<(), CatalogError> {
    let invalid = |reason: String| CatalogError::Invalid {
        model_type: model_type.to_string(),
        reason,
    };
    validate_segment(model_type).map_err(|err| invalid(err.to_string()))?;
    if entry.display_name.trim().is_empty() {
        return Err(invalid("display_name must be set".to_string()));
    }
    entry.config_key().map_err(|err| invalid(err.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests;
