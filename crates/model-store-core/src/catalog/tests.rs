// crates/model-store-core/src/catalog/tests.rs
// ============================================================================
// Module: Model Type Catalog Tests
// Description: Unit tests for catalog lookup, extension, and validation.
// Dependencies: model-store-core
// ============================================================================

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use super::*;

#[test]
fn builtin_catalog_has_llm_and_retriever() {
    let catalog = ModelTypeCatalog::builtin();
    assert_eq!(catalog.model_types().collect::<Vec<_>>(), vec!["llm", "retriever"]);
    let llm = catalog.resolve("llm").unwrap();
    assert_eq!(llm.config_key().unwrap(), "models/llm/model_config.json");
    assert_eq!(llm.defaults.get("parameters"), Some(&json!("8B")));
    let retriever = catalog.resolve("retriever").unwrap();
    assert_eq!(retriever.config_key().unwrap(), "models/retriever/model_config.json");
    assert_eq!(retriever.defaults.get("embedding_dimension"), Some(&json!(1024)));
}

#[test]
fn resolve_unknown_lists_available_types() {
    let catalog = ModelTypeCatalog::builtin();
    let err = catalog.resolve("unknown-model").unwrap_err();
    assert_eq!(
        err,
        CatalogError::UnknownModelType {
            model_type: "unknown-model".to_string(),
            available: vec!["llm".to_string(), "retriever".to_string()],
        }
    );
    assert!(err.to_string().contains("llm, retriever"));
}

#[test]
fn extended_overrides_and_adds_entries() {
    let mut extra = BTreeMap::new();
    extra.insert("reranker".to_string(), ModelTypeEntry::new("reranker", "Reranker v2"));
    extra.insert("llm".to_string(), ModelTypeEntry::new("llm", "Replacement LLM"));
    let catalog = ModelTypeCatalog::builtin().extended(extra).unwrap();
    assert_eq!(catalog.len(), 3);
    assert!(!catalog.is_empty());
    assert_eq!(catalog.resolve("llm").unwrap().display_name, "Replacement LLM");
    assert!(catalog.contains("reranker"));
}

#[test]
fn new_rejects_unsafe_entries() {
    let mut entries = BTreeMap::new();
    entries.insert("../escape".to_string(), ModelTypeEntry::new("x", "X"));
    assert!(matches!(ModelTypeCatalog::new(entries), Err(CatalogError::Invalid { .. })));

    let mut entry = ModelTypeEntry::new("ok", "Ok");
    entry.storage_prefix = "/abs/".to_string();
    let mut entries = BTreeMap::new();
    entries.insert("ok".to_string(), entry);
    assert!(matches!(ModelTypeCatalog::new(entries), Err(CatalogError::Invalid { .. })));

    let mut entries = BTreeMap::new();
    entries.insert("blank".to_string(), ModelTypeEntry::new("blank", "  "));
    assert!(ModelTypeCatalog::new(entries).is_err());
}

#[test]
fn entry_deserializes_with_defaults() {
    let entry: ModelTypeEntry = serde_json::from_value(json!({
        "display_name": "Reranker",
        "storage_prefix": "models/reranker/",
        "defaults": { "parameters": "1B" }
    }))
    .unwrap();
    assert_eq!(entry.config_file, DEFAULT_CONFIG_FILE);
    assert_eq!(entry.source_url, None);
    assert_eq!(entry.config_key().unwrap(), "models/reranker/model_config.json");
}

#[test]
fn empty_catalog_resolves_nothing() {
    let catalog = ModelTypeCatalog::new(BTreeMap::new()).unwrap();
    assert!(catalog.is_empty());
    assert_eq!(catalog.len(), 0);
    assert!(catalog.resolve("llm").is_err());
}
