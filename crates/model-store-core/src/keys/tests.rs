// crates/model-store-core/src/keys/tests.rs
// ============================================================================
// Module: Object Key Tests
// Description: Unit tests for config and lock key derivation.
// Purpose: Validate deterministic keys and fail-closed segment handling.
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
fn config_key_joins_prefix_and_file() {
    assert_eq!(
        config_key("models/llm/", DEFAULT_CONFIG_FILE).unwrap(),
        "models/llm/model_config.json"
    );
    assert_eq!(config_key("models/llm", "cfg.json").unwrap(), "models/llm/cfg.json");
}

#[test]
fn config_key_rejects_traversal() {
    assert!(config_key("models/../secrets/", DEFAULT_CONFIG_FILE).is_err());
    assert!(config_key("/models/llm/", DEFAULT_CONFIG_FILE).is_err());
    assert!(config_key("models/llm/", "nested/file.json").is_err());
    assert!(config_key("", DEFAULT_CONFIG_FILE).is_err());
}

#[test]
fn lock_key_is_deterministic() {
    assert_eq!(lock_key("deploy-1700000000").unwrap(), "locks/deploy-1700000000.json");
    assert_eq!(lock_key("deploy-1700000000").unwrap(), lock_key("deploy-1700000000").unwrap());
}

#[test]
fn lock_key_rejects_unsafe_ids() {
    for id in ["", ".", "..", "a/b", "a\\b", "line\nbreak"] {
        assert!(lock_key(id).is_err(), "expected rejection for {id:?}");
    }
    let long = "x".repeat(MAX_KEY_SEGMENT_LENGTH + 1);
    assert!(lock_key(&long).is_err());
}

#[test]
fn list_prefix_defaults_to_config_root() {
    assert_eq!(config_list_prefix("").unwrap(), "models/");
    assert_eq!(config_list_prefix("models/").unwrap(), "models/");
    assert_eq!(config_list_prefix("llm/").unwrap(), "models/llm/");
    assert_eq!(config_list_prefix("ret").unwrap(), "models/ret");
    assert_eq!(config_list_prefix("models").unwrap(), "models/");
    assert_eq!(config_list_prefix(" models ").unwrap(), "models/");
}

#[test]
fn list_prefix_strips_config_root_once() {
    assert_eq!(config_list_prefix("models/llm/").unwrap(), "models/llm/");
    assert_eq!(config_list_prefix("models/models/x").unwrap(), "models/models/x");
}

#[test]
fn list_prefix_rejects_traversal() {
    assert!(config_list_prefix("../locks/").is_err());
    assert!(config_list_prefix("llm/../../").is_err());
}

#[test]
fn normalize_prefix_appends_single_slash() {
    assert_eq!(normalize_prefix(" models/llm ").unwrap(), "models/llm/");
    assert_eq!(normalize_prefix("models/llm/").unwrap(), "models/llm/");
}
