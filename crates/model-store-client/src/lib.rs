// crates/model-store-client/src/lib.rs
// ============================================================================
// Module: Model Store Client Library
// Description: Config store façade and object-store backends.
// Purpose: Expose config/lock operations over S3 or in-memory storage.
// Dependencies: crate::{bootstrap, memory, object_store, s3, store}
// ============================================================================

//! ## Overview
//! The client crate turns the core data model into object-store traffic.
//! [`ConfigStore`] is the entry point; it talks to any
//! [`ObjectStoreClient`], with [`S3ObjectStoreClient`] for real buckets and
//! [`InMemoryObjectStore`] for tests and dry runs. [`run_bootstrap`] chains
//! the store operations into the deployment seeding workflow.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod bootstrap;
pub mod memory;
pub mod object_store;
pub mod s3;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use bootstrap::BootstrapPlan;
pub use bootstrap::BootstrapReport;
pub use bootstrap::PlannedUpload;
pub use bootstrap::UploadOutcome;
pub use bootstrap::run_bootstrap;
pub use memory::InMemoryBucketClient;
pub use memory::InMemoryObjectStore;
pub use memory::StoredObject;
pub use object_store::ObjectStoreClient;
pub use object_store::ObjectStoreError;
pub use object_store::ObjectWrite;
pub use object_store::WriteCondition;
pub use s3::S3ObjectStoreClient;
pub use store::ConfigLookup;
pub use store::ConfigStore;
pub use store::FailureKind;
pub use store::LockAcquisition;
pub use store::Readiness;
pub use store::StoreFailure;
pub use store::UnavailableReason;
