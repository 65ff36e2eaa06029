// crates/model-store-client/src/memory.rs
// ============================================================================
// Module: In-Memory Object Store
// Description: Process-local object store with buckets and injectable faults.
// Purpose: Stand in for S3 in tests and offline tooling.
// Dependencies: crate::object_store
// ============================================================================

//! ## Overview
//! [`InMemoryObjectStore`] holds any number of named buckets behind one
//! mutex. [`InMemoryObjectStore::client`] hands out an [`ObjectStoreClient`]
//! bound to a single bucket, which may or may not exist. Every trait call is
//! counted so tests can assert that an operation never reached the store.
//! A per-bucket fault makes every call against that bucket fail with a fixed
//! error, which is how access denial and outages are modeled.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::object_store::ObjectStoreClient;
use crate::object_store::ObjectStoreError;
use crate::object_store::ObjectWrite;
use crate::object_store::WriteCondition;

// ============================================================================
// SECTION: Types
// ============================================================================

/// An object as stored, with its content type and user metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Object body.
    pub bytes: Vec<u8>,
    /// MIME content type supplied on write.
    pub content_type: Option<String>,
    /// User metadata supplied on write.
    pub metadata: BTreeMap<String, String>,
}

/// One bucket's contents.
#[derive(Debug, Default)]
struct MemoryBucket {
    /// Objects ordered by key.
    objects: BTreeMap<String, StoredObject>,
    /// Error returned by every call while set.
    fault: Option<ObjectStoreError>,
}

/// Shared store state.
#[derive(Debug, Default)]
struct MemoryState {
    /// Buckets by name.
    buckets: BTreeMap<String, MemoryBucket>,
    /// Number of client calls that reached the store.
    requests: usize,
}

/// Process-local object store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryObjectStore {
    /// Shared state; clones observe the same buckets.
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryObjectStore {
    /// Creates an empty store with no buckets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with one empty bucket.
    #[must_use]
    pub fn with_bucket(bucket: &str) -> Self {
        let store = Self::new();
        store.create_bucket(bucket);
        store
    }

    /// Creates an empty bucket if it does not already exist.
    pub fn create_bucket(&self, bucket: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.buckets.entry(bucket.to_string()).or_default();
        }
    }

    /// Returns a client bound to `bucket`.
    #[must_use]
    pub fn client(&self, bucket: &str) -> InMemoryBucketClient {
        InMemoryBucketClient {
            store: self.clone(),
            bucket: bucket.to_string(),
        }
    }

    /// Sets or clears the fault returned by every call against `bucket`.
    pub fn set_fault(&self, bucket: &str, fault: Option<ObjectStoreError>) {
        if let Ok(mut state) = self.state.lock()
            && let Some(entry) = state.buckets.get_mut(bucket)
        {
            entry.fault = fault;
        }
    }

    /// Returns the number of client calls that reached the store.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.state.lock().map_or(0, |state| state.requests)
    }

    /// Returns a stored object without counting a request.
    #[must_use]
    pub fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        let state = self.state.lock().ok()?;
        state.buckets.get(bucket)?.objects.get(key).cloned()
    }

    /// Stores an object directly without counting a request.
    pub fn insert_raw(&self, bucket: &str, key: &str, bytes: Vec<u8>) {
        if let Ok(mut state) = self.state.lock() {
            state.buckets.entry(bucket.to_string()).or_default().objects.insert(
                key.to_string(),
                StoredObject {
                    bytes,
                    content_type: None,
                    metadata: BTreeMap::new(),
                },
            );
        }
    }

    /// Locks the state and counts one request.
    fn begin_request(&self) -> Result<MutexGuard<'_, MemoryState>, ObjectStoreError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| ObjectStoreError::Io("object store lock poisoned".to_string()))?;
        state.requests = state.requests.saturating_add(1);
        Ok(state)
    }
}

// ============================================================================
// SECTION: Bucket Client
// ============================================================================

/// [`ObjectStoreClient`] over one bucket of an [`InMemoryObjectStore`].
#[derive(Debug, Clone)]
pub struct InMemoryBucketClient {
    /// Backing store.
    store: InMemoryObjectStore,
    /// Bucket name.
    bucket: String,
}

impl InMemoryBucketClient {
    /// Runs `op` against the bucket after counting the request and applying faults.
    fn with_bucket<T>(
        &self,
        op: impl FnOnce(&mut MemoryBucket) -> Result<T, ObjectStoreError>,
    ) -> Result<T, ObjectStoreError> {
        let mut state = self.store.begin_request()?;
        let bucket = state
            .buckets
            .get_mut(&self.bucket)
            .ok_or_else(|| ObjectStoreError::BucketNotFound(self.bucket.clone()))?;
        if let Some(fault) = &bucket.fault {
            return Err(fault.clone());
        }
        op(bucket)
    }
}

impl ObjectStoreClient for InMemoryBucketClient {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn probe(&self) -> Result<(), ObjectStoreError> {
        self.with_bucket(|_| Ok(()))
    }

    fn put(&self, write: ObjectWrite) -> Result<(), ObjectStoreError> {
        self.with_bucket(|bucket| {
            if write.condition == WriteCondition::IfAbsent && bucket.objects.contains_key(&write.key)
            {
                return Err(ObjectStoreError::PreconditionFailed(write.key));
            }
            bucket.objects.insert(
                write.key,
                StoredObject {
                    bytes: write.bytes,
                    content_type: write.content_type,
                    metadata: write.metadata,
                },
            );
            Ok(())
        })
    }

    fn get(&self, key: &str, max_bytes: usize) -> Result<Vec<u8>, ObjectStoreError> {
        self.with_bucket(|bucket| {
            let object =
                bucket.objects.get(key).ok_or_else(|| ObjectStoreError::NotFound(key.to_string()))?;
            if object.bytes.len() > max_bytes {
                return Err(ObjectStoreError::TooLarge {
                    path: key.to_string(),
                    max_bytes,
                    actual_bytes: object.bytes.len(),
                });
            }
            Ok(object.bytes.clone())
        })
    }

    fn exists(&self, key: &str) -> Result<bool, ObjectStoreError> {
        self.with_bucket(|bucket| Ok(bucket.objects.contains_key(key)))
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, ObjectStoreError> {
        self.with_bucket(|bucket| {
            Ok(bucket
                .objects
                .range(prefix.to_string() ..)
                .take_while(|(key, _)| key.starts_with(prefix))
                .map(|(key, _)| key.clone())
                .collect())
        })
    }
}
