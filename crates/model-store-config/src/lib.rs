// crates/model-store-config/src/lib.rs
// ============================================================================
// Module: Model Store Config Library
// Description: Canonical config model, validation, and example generation.
// Purpose: Single source of truth for model-store.toml semantics.
// Dependencies: model-store-core, serde, toml
// ============================================================================

//! ## Overview
//! `model-store-config` defines the configuration model for the model store:
//! object-store connection settings, document base fields, diagnostics
//! destination and level, and the model-type catalog. Validation is strict
//! and fail-closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
