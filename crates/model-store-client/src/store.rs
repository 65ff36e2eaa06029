// crates/model-store-client/src/store.rs
// ============================================================================
// Module: Config Store
// Description: Config document and lock record operations over an object store.
// Purpose: Translate object-store outcomes into uniform store results.
// Dependencies: model-store-core, crate::object_store, crate::s3
// ============================================================================

//! ## Overview
//! [`ConfigStore`] is the façade every caller uses. It is connected once,
//! probing the bucket and recording [`Readiness`], and then serves
//! independent request/response operations:
//!
//! - `put_config` / `get_config` for per-model config documents,
//! - `put_lock` / `acquire_lock` / `lock_exists` for deployment locks,
//! - `list_configs` for config key discovery.
//!
//! No operation panics or propagates a backend error type. Failures come
//! back as [`StoreFailure`] (or `false` / an empty list where the operation
//! contract says so) and are recorded on the injected [`DiagnosticSink`].
//! Operations on a store that is not ready, or for a model type the catalog
//! does not know, never reach the backend.
//!
//! `put_lock` writes unconditionally. A caller that checks `lock_exists` and
//! then calls `put_lock` races any other writer doing the same;
//! `acquire_lock` uses the backend's put-if-absent instead.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use model_store_config::ObjectStoreConfig;
use model_store_core::ConfigDocument;
use model_store_core::DiagnosticEvent;
use model_store_core::DiagnosticLevel;
use model_store_core::DiagnosticSink;
use model_store_core::DocumentError;
use model_store_core::DocumentSettings;
use model_store_core::KeyError;
use model_store_core::LockRecord;
use model_store_core::ModelTypeCatalog;
use model_store_core::ModelTypeEntry;
use model_store_core::UploadInstant;
use model_store_core::keys::JSON_SUFFIX;
use model_store_core::keys::config_list_prefix;
use model_store_core::keys::lock_key;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::object_store::ObjectStoreClient;
use crate::object_store::ObjectStoreError;
use crate::object_store::ObjectWrite;
use crate::s3::S3ObjectStoreClient;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum config document or lock record size accepted on read.
pub const MAX_DOCUMENT_BYTES: usize = 1024 * 1024;
/// Content type stamped on every write.
pub const JSON_CONTENT_TYPE: &str = "application/json";
/// Object metadata tag naming the model type.
pub const METADATA_MODEL_TYPE: &str = "model-type";
/// Object metadata tag naming the uploader.
pub const METADATA_UPLOADED_BY: &str = "uploaded-by";

// ============================================================================
// SECTION: Readiness
// ============================================================================

/// Why a store could not be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    /// No credentials were available.
    MissingCredentials,
    /// The bucket does not exist.
    BucketNotFound,
    /// The caller may not access the bucket.
    AccessDenied,
    /// The endpoint could not be reached.
    EndpointUnreachable,
    /// Any other fault.
    Unknown,
}

impl UnavailableReason {
    /// Returns the stable kebab-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingCredentials => "missing-credentials",
            Self::BucketNotFound => "bucket-not-found",
            Self::AccessDenied => "access-denied",
            Self::EndpointUnreachable => "endpoint-unreachable",
            Self::Unknown => "unknown",
        }
    }

    /// Classifies a backend error.
    #[must_use]
    pub const fn from_error(error: &ObjectStoreError) -> Self {
        match error {
            ObjectStoreError::MissingCredentials(_) => Self::MissingCredentials,
            ObjectStoreError::BucketNotFound(_) => Self::BucketNotFound,
            ObjectStoreError::AccessDenied(_) => Self::AccessDenied,
            ObjectStoreError::EndpointUnreachable(_) => Self::EndpointUnreachable,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of connecting a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// The bucket was probed successfully.
    Ready,
    /// The bucket cannot be used.
    Unavailable(UnavailableReason),
}

impl Readiness {
    /// Returns true when the store is ready.
    #[must_use]
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }
}

// ============================================================================
// SECTION: Failures
// ============================================================================

/// Classification of a failed store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No credentials were available.
    MissingCredentials,
    /// The bucket does not exist.
    BucketNotFound,
    /// The caller may not access the bucket or object.
    AccessDenied,
    /// The endpoint could not be reached.
    EndpointUnreachable,
    /// The object does not exist.
    KeyNotFound,
    /// Any other backend or I/O failure.
    TransportError,
    /// A stored or generated document is not valid JSON.
    ParseError,
    /// The model type is not in the catalog.
    UnknownModelType,
    /// The store was not ready when the operation ran.
    NotReady,
    /// A derived object key was rejected.
    InvalidKey,
    /// A stored object exceeded [`MAX_DOCUMENT_BYTES`].
    TooLarge,
    /// A conditional write found an existing object.
    PreconditionFailed,
}

impl FailureKind {
    /// Returns the stable kebab-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingCredentials => "missing-credentials",
            Self::BucketNotFound => "bucket-not-found",
            Self::AccessDenied => "access-denied",
            Self::EndpointUnreachable => "endpoint-unreachable",
            Self::KeyNotFound => "key-not-found",
            Self::TransportError => "transport-error",
            Self::ParseError => "parse-error",
            Self::UnknownModelType => "unknown-model-type",
            Self::NotReady => "not-ready",
            Self::InvalidKey => "invalid-key",
            Self::TooLarge => "too-large",
            Self::PreconditionFailed => "precondition-failed",
        }
    }

    /// Classifies a backend error.
    #[must_use]
    pub const fn from_error(error: &ObjectStoreError) -> Self {
        match error {
            ObjectStoreError::MissingCredentials(_) => Self::MissingCredentials,
            ObjectStoreError::BucketNotFound(_) => Self::BucketNotFound,
            ObjectStoreError::AccessDenied(_) => Self::AccessDenied,
            ObjectStoreError::EndpointUnreachable(_) => Self::EndpointUnreachable,
            ObjectStoreError::NotFound(_) => Self::KeyNotFound,
            ObjectStoreError::PreconditionFailed(_) => Self::PreconditionFailed,
            ObjectStoreError::TooLarge {
                ..
            } => Self::TooLarge,
            ObjectStoreError::Invalid(_) => Self::InvalidKey,
            ObjectStoreError::Io(_) | ObjectStoreError::Backend(_) => Self::TransportError,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed store operation with a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct StoreFailure {
    /// Failure classification.
    pub kind: FailureKind,
    /// Diagnostic message.
    pub message: String,
}

impl StoreFailure {
    /// Creates a failure.
    #[must_use]
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<ObjectStoreError> for StoreFailure {
    fn from(error: ObjectStoreError) -> Self {
        Self::new(FailureKind::from_error(&error), error.to_string())
    }
}

impl From<KeyError> for StoreFailure {
    fn from(error: KeyError) -> Self {
        Self::new(FailureKind::InvalidKey, error.to_string())
    }
}

impl From<DocumentError> for StoreFailure {
    fn from(error: DocumentError) -> Self {
        Self::new(FailureKind::ParseError, error.to_string())
    }
}

// ============================================================================
// SECTION: Results
// ============================================================================

/// Result of reading a config document.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigLookup {
    /// The document exists and parsed.
    Found(ConfigDocument),
    /// No document is stored for the model type.
    NotFound,
}

/// Result of a conditional lock write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockAcquisition {
    /// The lock was written at this key.
    Acquired(String),
    /// A lock for the deployment already exists.
    AlreadyHeld,
}

// ============================================================================
// SECTION: Config Store
// ============================================================================

/// Config document and lock record store bound to one bucket.
pub struct ConfigStore {
    /// Backend client; absent when the backend could not be built.
    client: Option<Arc<dyn ObjectStoreClient>>,
    /// Bucket name, for reporting.
    bucket: String,
    /// Known model types.
    catalog: ModelTypeCatalog,
    /// Base field values for generated documents.
    settings: DocumentSettings,
    /// Diagnostic destination.
    diagnostics: Arc<dyn DiagnosticSink>,
    /// Connect outcome.
    readiness: Readiness,
}

impl ConfigStore {
    /// Connects through an existing client, probing its bucket once.
    #[must_use]
    pub fn connect(
        client: Arc<dyn ObjectStoreClient>,
        catalog: ModelTypeCatalog,
        settings: DocumentSettings,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        let bucket = client.bucket().to_string();
        let readiness = match client.probe() {
            Ok(()) => {
                diagnostics.record(&DiagnosticEvent::new(
                    DiagnosticLevel::Info,
                    "connect",
                    format!("connected to bucket {bucket}"),
                ));
                Readiness::Ready
            }
            Err(err) => {
                let reason = UnavailableReason::from_error(&err);
                diagnostics.record(
                    &DiagnosticEvent::new(
                        DiagnosticLevel::Error,
                        "connect",
                        format!("bucket {bucket} unavailable: {err}"),
                    )
                    .with_kind(reason.as_str()),
                );
                Readiness::Unavailable(reason)
            }
        };
        Self {
            client: Some(client),
            bucket,
            catalog,
            settings,
            diagnostics,
            readiness,
        }
    }

    /// Builds an S3 client from `config` and connects through it.
    ///
    /// A client that cannot be built yields an unavailable store.
    #[must_use]
    pub fn connect_s3(
        config: &ObjectStoreConfig,
        catalog: ModelTypeCatalog,
        settings: DocumentSettings,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        match S3ObjectStoreClient::new(config) {
            Ok(client) => Self::connect(Arc::new(client), catalog, settings, diagnostics),
            Err(err) => {
                let reason = UnavailableReason::from_error(&err);
                diagnostics.record(
                    &DiagnosticEvent::new(
                        DiagnosticLevel::Error,
                        "connect",
                        format!("failed to initialize s3 client: {err}"),
                    )
                    .with_kind(reason.as_str()),
                );
                Self {
                    client: None,
                    bucket: config.bucket.trim().to_string(),
                    catalog,
                    settings,
                    diagnostics,
                    readiness: Readiness::Unavailable(reason),
                }
            }
        }
    }

    /// Returns the connect outcome.
    #[must_use]
    pub const fn readiness(&self) -> Readiness {
        self.readiness
    }

    /// Returns the bucket name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Returns the model-type catalog.
    #[must_use]
    pub const fn catalog(&self) -> &ModelTypeCatalog {
        &self.catalog
    }

    /// Returns the document settings.
    #[must_use]
    pub const fn settings(&self) -> &DocumentSettings {
        &self.settings
    }

    /// Records a workflow event on the store's diagnostic sink.
    pub fn record(&self, level: DiagnosticLevel, operation: &'static str, message: impl Into<String>) {
        self.diagnostics.record(&DiagnosticEvent::new(level, operation, message));
    }

    // ------------------------------------------------------------------------
    // Config documents
    // ------------------------------------------------------------------------

    /// Builds and uploads the config document for `model_type`.
    ///
    /// `extra` is merged over the generated fields; the caller wins on overlap.
    ///
    /// # Errors
    ///
    /// Returns [`StoreFailure`] for unknown model types, a store that is not
    /// ready, or a failed write.
    pub fn put_config(
        &self,
        model_type: &str,
        extra: Option<&Map<String, Value>>,
    ) -> Result<String, StoreFailure> {
        const OP: &str = "put_config";
        let (entry, key) = self.resolve(OP, model_type)?;
        let client = self.ready_client(OP, Some(&key))?;
        let bytes = UploadInstant::now()
            .map(|instant| ConfigDocument::build(model_type, entry, &self.settings, &instant, extra))
            .and_then(|document| document.to_json_vec())
            .map_err(|err| self.fail(OP, Some(&key), err.into()))?;
        let mut metadata = self.settings.metadata.clone();
        metadata.insert(METADATA_MODEL_TYPE.to_string(), model_type.to_string());
        metadata.insert(METADATA_UPLOADED_BY.to_string(), self.settings.owner.clone());
        let write =
            ObjectWrite::new(key.clone(), bytes).content_type(JSON_CONTENT_TYPE).metadata(metadata);
        client.put(write).map_err(|err| self.fail(OP, Some(&key), err.into()))?;
        self.note(DiagnosticLevel::Info, OP, Some(&key), format!("uploaded {model_type} config"));
        Ok(key)
    }

    /// Downloads and parses the config document for `model_type`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreFailure`] for unknown model types, a store that is not
    /// ready, transport failures, oversized objects, or unparseable JSON. An
    /// absent document is [`ConfigLookup::NotFound`], not an error.
    pub fn get_config(&self, model_type: &str) -> Result<ConfigLookup, StoreFailure> {
        const OP: &str = "get_config";
        let (_, key) = self.resolve(OP, model_type)?;
        let client = self.ready_client(OP, Some(&key))?;
        let bytes = match client.get(&key, MAX_DOCUMENT_BYTES) {
            Ok(bytes) => bytes,
            Err(ObjectStoreError::NotFound(_)) => {
                self.note(
                    DiagnosticLevel::Warning,
                    OP,
                    Some(&key),
                    format!("no {model_type} config stored"),
                );
                return Ok(ConfigLookup::NotFound);
            }
            Err(err) => return Err(self.fail(OP, Some(&key), err.into())),
        };
        let document =
            ConfigDocument::from_json_slice(&bytes).map_err(|err| self.fail(OP, Some(&key), err.into()))?;
        self.note(DiagnosticLevel::Info, OP, Some(&key), format!("downloaded {model_type} config"));
        Ok(ConfigLookup::Found(document))
    }

    /// Lists config document keys under `models/<prefix>`.
    ///
    /// Only keys ending in `.json` are returned, in the backend's order. Any
    /// failure yields an empty list.
    #[must_use]
    pub fn list_configs(&self, prefix: &str) -> Vec<String> {
        const OP: &str = "list_configs";
        let list_prefix = match config_list_prefix(prefix) {
            Ok(list_prefix) => list_prefix,
            Err(err) => {
                let _ = self.fail(OP, None, err.into());
                return Vec::new();
            }
        };
        let Ok(client) = self.ready_client(OP, Some(&list_prefix)) else {
            return Vec::new();
        };
        match client.list(&list_prefix) {
            Ok(keys) => {
                let configs: Vec<String> =
                    keys.into_iter().filter(|key| key.ends_with(JSON_SUFFIX)).collect();
                self.note(
                    DiagnosticLevel::Info,
                    OP,
                    Some(&list_prefix),
                    format!("found {} config files", configs.len()),
                );
                configs
            }
            Err(err) => {
                let _ = self.fail(OP, Some(&list_prefix), err.into());
                Vec::new()
            }
        }
    }

    // ------------------------------------------------------------------------
    // Locks
    // ------------------------------------------------------------------------

    /// Writes a lock record for `deployment_id`, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreFailure`] for invalid identifiers, a store that is not
    /// ready, or a failed write.
    pub fn put_lock(
        &self,
        deployment_id: &str,
        payload: Map<String, Value>,
    ) -> Result<String, StoreFailure> {
        const OP: &str = "put_lock";
        let (key, write) = self.lock_write(OP, deployment_id, payload)?;
        let client = self.ready_client(OP, Some(&key))?;
        client.put(write).map_err(|err| self.fail(OP, Some(&key), err.into()))?;
        self.note(DiagnosticLevel::Info, OP, Some(&key), format!("created lock for {deployment_id}"));
        Ok(key)
    }

    /// Writes a lock record for `deployment_id` only if none exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreFailure`] for invalid identifiers, a store that is not
    /// ready, or a failed write. An existing lock is
    /// [`LockAcquisition::AlreadyHeld`], not an error.
    pub fn acquire_lock(
        &self,
        deployment_id: &str,
        payload: Map<String, Value>,
    ) -> Result<LockAcquisition, StoreFailure> {
        const OP: &str = "acquire_lock";
        let (key, write) = self.lock_write(OP, deployment_id, payload)?;
        let client = self.ready_client(OP, Some(&key))?;
        match client.put(write.if_absent()) {
            Ok(()) => {
                self.note(
                    DiagnosticLevel::Info,
                    OP,
                    Some(&key),
                    format!("acquired lock for {deployment_id}"),
                );
                Ok(LockAcquisition::Acquired(key))
            }
            Err(ObjectStoreError::PreconditionFailed(_)) => {
                self.note(
                    DiagnosticLevel::Warning,
                    OP,
                    Some(&key),
                    format!("lock for {deployment_id} already held"),
                );
                Ok(LockAcquisition::AlreadyHeld)
            }
            Err(err) => Err(self.fail(OP, Some(&key), err.into())),
        }
    }

    /// Reports whether a lock record exists for `deployment_id`.
    ///
    /// Returns false both when the lock is absent and when the check fails;
    /// failures are recorded at error level.
    #[must_use]
    pub fn lock_exists(&self, deployment_id: &str) -> bool {
        const OP: &str = "lock_exists";
        let key = match lock_key(deployment_id) {
            Ok(key) => key,
            Err(err) => {
                let _ = self.fail(OP, None, err.into());
                return false;
            }
        };
        let Ok(client) = self.ready_client(OP, Some(&key)) else {
            return false;
        };
        match client.exists(&key) {
            Ok(true) => {
                self.note(
                    DiagnosticLevel::Warning,
                    OP,
                    Some(&key),
                    format!("lock exists for {deployment_id}"),
                );
                true
            }
            Ok(false) => {
                self.note(DiagnosticLevel::Info, OP, Some(&key), format!("no lock for {deployment_id}"));
                false
            }
            Err(err) => {
                let _ = self.fail(OP, Some(&key), err.into());
                false
            }
        }
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    /// Resolves a model type to its catalog entry and config key.
    fn resolve(
        &self,
        op: &'static str,
        model_type: &str,
    ) -> Result<(&ModelTypeEntry, String), StoreFailure> {
        let entry = self.catalog.resolve(model_type).map_err(|err| {
            self.fail(op, None, StoreFailure::new(FailureKind::UnknownModelType, err.to_string()))
        })?;
        let key = entry.config_key().map_err(|err| self.fail(op, None, err.into()))?;
        Ok((entry, key))
    }

    /// Builds the lock key and its unconditional write.
    fn lock_write(
        &self,
        op: &'static str,
        deployment_id: &str,
        payload: Map<String, Value>,
    ) -> Result<(String, ObjectWrite), StoreFailure> {
        let key = lock_key(deployment_id).map_err(|err| self.fail(op, None, err.into()))?;
        let bytes = UploadInstant::now()
            .map(|instant| LockRecord::build(deployment_id, &self.settings.owner, payload, &instant))
            .and_then(|record| record.to_json_vec())
            .map_err(|err| self.fail(op, Some(&key), err.into()))?;
        let write = ObjectWrite::new(key.clone(), bytes).content_type(JSON_CONTENT_TYPE);
        Ok((key, write))
    }

    /// Returns the client when the store is ready.
    fn ready_client(
        &self,
        op: &'static str,
        key: Option<&str>,
    ) -> Result<&dyn ObjectStoreClient, StoreFailure> {
        match (&self.client, self.readiness) {
            (Some(client), Readiness::Ready) => Ok(client.as_ref()),
            (_, Readiness::Unavailable(reason)) => Err(self.fail(
                op,
                key,
                StoreFailure::new(
                    FailureKind::NotReady,
                    format!("bucket {} unavailable ({reason})", self.bucket),
                ),
            )),
            (None, Readiness::Ready) => Err(self.fail(
                op,
                key,
                StoreFailure::new(FailureKind::NotReady, "object store client missing"),
            )),
        }
    }

    /// Records a failure at error level and returns it.
    fn fail(&self, op: &'static str, key: Option<&str>, failure: StoreFailure) -> StoreFailure {
        let mut event = DiagnosticEvent::new(DiagnosticLevel::Error, op, failure.message.clone())
            .with_kind(failure.kind.as_str());
        if let Some(key) = key {
            event = event.with_key(key);
        }
        self.diagnostics.record(&event);
        failure
    }

    /// Records a non-failure event.
    fn note(&self, level: DiagnosticLevel, op: &'static str, key: Option<&str>, message: String) {
        let mut event = DiagnosticEvent::new(level, op, message);
        if let Some(key) = key {
            event = event.with_key(key);
        }
        self.diagnostics.record(&event);
    }
}

#[cfg(test)]
mod tests;
