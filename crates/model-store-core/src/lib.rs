// crates/model-store-core/src/lib.rs
// ============================================================================
// Module: Model Store Core Library
// Description: Public API surface for the model store data model.
// Purpose: Expose the catalog, documents, key derivation, and diagnostics.
// Dependencies: crate::{catalog, diagnostics, document, keys}
// ============================================================================

//! ## Overview
//! Model store core defines the data written to and read from the object
//! store: the model-type catalog, config documents, lock records, and the
//! deterministic keys they live under. It also owns the diagnostic sink seam
//! used by every store operation. It has no I/O dependencies beyond optional
//! file-backed diagnostics.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod catalog;
pub mod diagnostics;
pub mod document;
pub mod keys;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::CatalogError;
pub use catalog::ModelTypeCatalog;
pub use catalog::ModelTypeEntry;
pub use diagnostics::DiagnosticEvent;
pub use diagnostics::DiagnosticLevel;
pub use diagnostics::DiagnosticSink;
pub use diagnostics::FanoutSink;
pub use diagnostics::FileDiagnosticSink;
pub use diagnostics::LevelFilterSink;
pub use diagnostics::MemoryDiagnosticSink;
pub use diagnostics::NoopDiagnosticSink;
pub use diagnostics::StderrDiagnosticSink;
pub use document::ConfigDocument;
pub use document::DocumentError;
pub use document::DocumentSettings;
pub use document::LockRecord;
pub use document::UploadInstant;
pub use keys::KeyError;
