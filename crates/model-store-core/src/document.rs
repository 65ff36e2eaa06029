// crates/model-store-core/src/document.rs
// ============================================================================
// Module: Config Documents and Lock Records
// Description: JSON payloads written to the object store.
// Purpose: Build config documents and lock records with stable base fields.
// Dependencies: serde, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! A [`ConfigDocument`] is a JSON object describing one model type. It always
//! carries the base fields (`model_type`, `upload_timestamp`,
//! `upload_date_iso`, `version`, `environment`, `owner`), followed by the
//! catalog entry's `model_name` and defaults, followed by caller fields. Later
//! layers overwrite earlier ones on key collision.
//!
//! A [`LockRecord`] is the caller payload augmented with `lock_timestamp`,
//! `lock_owner`, and `deployment_id`. Everything beyond the base fields is
//! opaque pass-through data.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::catalog::ModelTypeEntry;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Field holding the model-type identifier.
pub const FIELD_MODEL_TYPE: &str = "model_type";
/// Field holding the upload time in epoch seconds.
pub const FIELD_UPLOAD_TIMESTAMP: &str = "upload_timestamp";
/// Field holding the upload time as ISO-8601 UTC.
pub const FIELD_UPLOAD_DATE_ISO: &str = "upload_date_iso";
/// Field holding the document version.
pub const FIELD_VERSION: &str = "version";
/// Field holding the environment tag.
pub const FIELD_ENVIRONMENT: &str = "environment";
/// Field holding the document owner.
pub const FIELD_OWNER: &str = "owner";
/// Field holding the catalog display name.
pub const FIELD_MODEL_NAME: &str = "model_name";
/// Field holding the lock creation time in epoch seconds.
pub const FIELD_LOCK_TIMESTAMP: &str = "lock_timestamp";
/// Field holding the lock owner.
pub const FIELD_LOCK_OWNER: &str = "lock_owner";
/// Field holding the deployment identifier.
pub const FIELD_DEPLOYMENT_ID: &str = "deployment_id";

/// ISO-8601 UTC format with second precision (`YYYY-MM-DDTHH:MM:SSZ`).
const ISO_SECONDS_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while building or decoding documents.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The stored payload is not valid JSON.
    #[error("document parse error: {0}")]
    Parse(String),
    /// The stored payload is JSON but not an object.
    #[error("document must be a JSON object")]
    NotAnObject,
    /// The document could not be serialized.
    #[error("document serialize error: {0}")]
    Serialize(String),
    /// The timestamp could not be formatted.
    #[error("timestamp format error: {0}")]
    Timestamp(String),
}

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Base field values stamped onto every generated document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentSettings {
    /// Document version string.
    #[serde(default = "default_version")]
    pub version: String,
    /// Environment tag.
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Owner recorded in documents and as the lock owner.
    #[serde(default = "default_owner")]
    pub owner: String,
    /// Extra object metadata tags attached to config uploads.
    #[serde(default = "default_metadata")]
    pub metadata: BTreeMap<String, String>,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            version: default_version(),
            environment: default_environment(),
            owner: default_owner(),
            metadata: default_metadata(),
        }
    }
}

/// Default document version.
fn default_version() -> String {
    "1.0".to_string()
}

/// Default environment tag.
fn default_environment() -> String {
    "hackathon".to_string()
}

/// Default owner.
fn default_owner() -> String {
    "pydev369".to_string()
}

/// Default extra metadata tags.
fn default_metadata() -> BTreeMap<String, String> {
    BTreeMap::from([("hackathon".to_string(), "nvidia-agentic-app".to_string())])
}

// ============================================================================
// SECTION: Timestamps
// ============================================================================

/// A single wall-clock instant in both stored representations.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadInstant {
    /// Seconds since the Unix epoch, with sub-second precision.
    pub epoch_seconds: f64,
    /// ISO-8601 UTC rendering (`YYYY-MM-DDTHH:MM:SSZ`).
    pub iso: String,
}

impl UploadInstant {
    /// Captures the current instant.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Timestamp`] when formatting fails.
    pub fn now() -> Result<Self, DocumentError> {
        Self::from_datetime(OffsetDateTime::now_utc())
    }

    /// Builds an instant from a date-time (converted to UTC).
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Timestamp`] when formatting fails.
    pub fn from_datetime(value: OffsetDateTime) -> Result<Self, DocumentError> {
        let utc = value.to_offset(time::UtcOffset::UTC);
        let iso = utc
            .format(ISO_SECONDS_FORMAT)
            .map_err(|err| DocumentError::Timestamp(err.to_string()))?;
        let epoch_seconds = (utc - OffsetDateTime::UNIX_EPOCH).as_seconds_f64();
        Ok(Self {
            epoch_seconds,
            iso,
        })
    }
}

// ============================================================================
// SECTION: Config Document
// ============================================================================

/// JSON config document for one model type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigDocument(Map<String, Value>);

impl ConfigDocument {
    /// Builds a document for `model_type`, merging `extra` last.
    #[must_use]
    pub fn build(
        model_type: &str,
        entry: &ModelTypeEntry,
        settings: &DocumentSettings,
        instant: &UploadInstant,
        extra: Option<&Map<String, Value>>,
    ) -> Self {
        let mut fields = Map::new();
        fields.insert(FIELD_MODEL_TYPE.to_string(), Value::from(model_type));
        fields.insert(FIELD_UPLOAD_TIMESTAMP.to_string(), Value::from(instant.epoch_seconds));
        fields.insert(FIELD_UPLOAD_DATE_ISO.to_string(), Value::from(instant.iso.as_str()));
        fields.insert(FIELD_VERSION.to_string(), Value::from(settings.version.as_str()));
        fields.insert(FIELD_ENVIRONMENT.to_string(), Value::from(settings.environment.as_str()));
        fields.insert(FIELD_OWNER.to_string(), Value::from(settings.owner.as_str()));
        fields.insert(FIELD_MODEL_NAME.to_string(), Value::from(entry.display_name.as_str()));
        merge(&mut fields, &entry.defaults);
        if let Some(extra) = extra {
            merge(&mut fields, extra);
        }
        Self(fields)
    }

    /// Decodes a stored document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] when the bytes are not a JSON object.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, DocumentError> {
        decode_object(bytes).map(Self)
    }

    /// Encodes the document as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Serialize`] when serialization fails.
    pub fn to_json_vec(&self) -> Result<Vec<u8>, DocumentError> {
        serde_json::to_vec_pretty(&self.0).map_err(|err| DocumentError::Serialize(err.to_string()))
    }

    /// Returns the `model_type` field when present.
    #[must_use]
    pub fn model_type(&self) -> Option<&str> {
        self.0.get(FIELD_MODEL_TYPE).and_then(Value::as_str)
    }

    /// Returns a field by name.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns the underlying JSON object.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the document, returning the JSON object.
    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

// ============================================================================
// SECTION: Lock Record
// ============================================================================

/// JSON lock record marking an in-progress deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LockRecord(Map<String, Value>);

impl LockRecord {
    /// Builds a lock record; lock fields overwrite same-named payload fields.
    #[must_use]
    pub fn build(
        deployment_id: &str,
        owner: &str,
        payload: Map<String, Value>,
        instant: &UploadInstant,
    ) -> Self {
        let mut fields = payload;
        fields.insert(FIELD_LOCK_TIMESTAMP.to_string(), Value::from(instant.epoch_seconds));
        fields.insert(FIELD_LOCK_OWNER.to_string(), Value::from(owner));
        fields.insert(FIELD_DEPLOYMENT_ID.to_string(), Value::from(deployment_id));
        Self(fields)
    }

    /// Decodes a stored lock record.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] when the bytes are not a JSON object.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, DocumentError> {
        decode_object(bytes).map(Self)
    }

    /// Encodes the record as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Serialize`] when serialization fails.
    pub fn to_json_vec(&self) -> Result<Vec<u8>, DocumentError> {
        serde_json::to_vec_pretty(&self.0).map_err(|err| DocumentError::Serialize(err.to_string()))
    }

    /// Returns the `deployment_id` field when present.
    #[must_use]
    pub fn deployment_id(&self) -> Option<&str> {
        self.0.get(FIELD_DEPLOYMENT_ID).and_then(Value::as_str)
    }

    /// Returns a field by name.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns the underlying JSON object.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Copies every field of `layer` over `target` (last write wins).
fn merge(target: &mut Map<String, Value>, layer: &Map<String, Value>) {
    for (key, value) in layer {
        target.insert(key.clone(), value.clone());
    }
}

/// Parses bytes as a JSON object.
fn decode_object(bytes: &[u8]) -> Result<Map<String, Value>, DocumentError> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|err| DocumentError::Parse(err.to_string()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(DocumentError::NotAnObject),
    }
}
