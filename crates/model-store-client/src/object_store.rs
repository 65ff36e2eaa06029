// crates/model-store-client/src/object_store.rs
// ============================================================================
// Module: Object Store Client
// Description: Minimal blocking object-store abstraction and error taxonomy.
// Purpose: Decouple the config store from any particular storage backend.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! [`ObjectStoreClient`] is the capability set the config store depends on:
//! a bucket probe, put with content type, metadata and an optional if-absent
//! condition, bounded get, existence check, and prefix listing. Every call
//! blocks until the backend answers. Backends classify their failures into
//! [`ObjectStoreError`] so callers never see transport-specific error types.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Object-store errors, classified by cause.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectStoreError {
    /// No credentials could be resolved for the backend.
    #[error("object store credentials not found: {0}")]
    MissingCredentials(String),
    /// The bucket does not exist.
    #[error("bucket not found: {0}")]
    BucketNotFound(String),
    /// The caller is not permitted to access the bucket or object.
    #[error("access denied: {0}")]
    AccessDenied(String),
    /// The endpoint could not be reached (network, DNS, region, timeout).
    #[error("object store endpoint unreachable: {0}")]
    EndpointUnreachable(String),
    /// The object does not exist.
    #[error("object not found: {0}")]
    NotFound(String),
    /// A conditional write found an existing object.
    #[error("object already exists: {0}")]
    PreconditionFailed(String),
    /// Object exceeds size limits.
    #[error("object too large: {path} ({actual_bytes} > {max_bytes})")]
    TooLarge {
        /// Object path.
        path: String,
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual size in bytes.
        actual_bytes: usize,
    },
    /// Invalid configuration or key input.
    #[error("object store invalid: {0}")]
    Invalid(String),
    /// Backend I/O failure.
    #[error("object store io error: {0}")]
    Io(String),
    /// Backend returned an unclassified error.
    #[error("object store backend error: {0}")]
    Backend(String),
}

// ============================================================================
// SECTION: Write Requests
// ============================================================================

/// Overwrite behavior for a put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteCondition {
    /// Replace any existing object.
    #[default]
    Overwrite,
    /// Fail with [`ObjectStoreError::PreconditionFailed`] if the key exists.
    IfAbsent,
}

/// A single object write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectWrite {
    /// Object key.
    pub key: String,
    /// Object body.
    pub bytes: Vec<u8>,
    /// MIME content type.
    pub content_type: Option<String>,
    /// User metadata attached to the object.
    pub metadata: BTreeMap<String, String>,
    /// Overwrite behavior.
    pub condition: WriteCondition,
}

impl ObjectWrite {
    /// Creates an unconditional write with no content type or metadata.
    #[must_use]
    pub fn new(key: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            key: key.into(),
            bytes,
            content_type: None,
            metadata: BTreeMap::new(),
            condition: WriteCondition::Overwrite,
        }
    }

    /// Sets the content type.
    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Sets the user metadata.
    #[must_use]
    pub fn metadata(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Makes the write conditional on the key being absent.
    #[must_use]
    pub const fn if_absent(mut self) -> Self {
        self.condition = WriteCondition::IfAbsent;
        self
    }
}

// ============================================================================
// SECTION: Client Trait
// ============================================================================

/// Minimal blocking object-store client scoped to one bucket.
pub trait ObjectStoreClient: Send + Sync {
    /// Returns the bucket this client addresses.
    fn bucket(&self) -> &str;

    /// Verifies the bucket exists and is accessible.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStoreError`] classifying why the bucket is unusable.
    fn probe(&self) -> Result<(), ObjectStoreError>;

    /// Writes a single object.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStoreError`] when the write fails or its condition is not met.
    fn put(&self, write: ObjectWrite) -> Result<(), ObjectStoreError>;

    /// Reads a single object with a size limit.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStoreError::NotFound`] for absent keys, or another
    /// variant for transport and size failures.
    fn get(&self, key: &str, max_bytes: usize) -> Result<Vec<u8>, ObjectStoreError>;

    /// Checks whether an object exists without reading it.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStoreError`] when existence cannot be determined.
    fn exists(&self, key: &str) -> Result<bool, ObjectStoreError>;

    /// Lists object keys under a prefix in the backend's native order.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStoreError`] when listing fails.
    fn list(&self, prefix: &str) -> Result<Vec<String>, ObjectStoreError>;
}
