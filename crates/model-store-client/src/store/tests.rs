// crates/model-store-client/src/store/tests.rs
// ============================================================================
// Module: Config Store Tests
// Description: Unit tests for store failure mapping and write shapes.
// Purpose: Validate metadata, size limits, and diagnostic severity rules.
// Dependencies: model-store-client, model-store-core
// ============================================================================

//! ## Overview
//! Exercises the config store against the in-memory backend, checking the
//! object shapes it writes and how each backend failure is classified.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use model_store_core::MemoryDiagnosticSink;
use model_store_core::document::FIELD_LOCK_OWNER;
use serde_json::json;

use super::*;
use crate::memory::InMemoryObjectStore;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

const BUCKET: &str = "unit-bucket";

fn connected(store: &InMemoryObjectStore) -> (ConfigStore, Arc<MemoryDiagnosticSink>) {
    let sink = Arc::new(MemoryDiagnosticSink::new());
    let config_store = ConfigStore::connect(
        Arc::new(store.client(BUCKET)),
        ModelTypeCatalog::builtin(),
        DocumentSettings::default(),
        sink.clone(),
    );
    (config_store, sink)
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

// ============================================================================
// SECTION: Classification
// ============================================================================

#[test]
fn backend_errors_map_to_failure_kinds() {
    let cases = [
        (ObjectStoreError::MissingCredentials("x".into()), FailureKind::MissingCredentials),
        (ObjectStoreError::BucketNotFound("x".into()), FailureKind::BucketNotFound),
        (ObjectStoreError::AccessDenied("x".into()), FailureKind::AccessDenied),
        (ObjectStoreError::EndpointUnreachable("x".into()), FailureKind::EndpointUnreachable),
        (ObjectStoreError::NotFound("x".into()), FailureKind::KeyNotFound),
        (ObjectStoreError::PreconditionFailed("x".into()), FailureKind::PreconditionFailed),
        (ObjectStoreError::Io("x".into()), FailureKind::TransportError),
        (ObjectStoreError::Backend("x".into()), FailureKind::TransportError),
    ];
    for (error, kind) in cases {
        assert_eq!(StoreFailure::from(error).kind, kind);
    }
}

#[test]
fn unavailable_reason_falls_back_to_unknown() {
    let reason = UnavailableReason::from_error(&ObjectStoreError::Backend("boom".into()));
    assert_eq!(reason, UnavailableReason::Unknown);
    assert_eq!(reason.as_str(), "unknown");
}

#[test]
fn failure_display_leads_with_kind_label() {
    let failure = StoreFailure::new(FailureKind::UnknownModelType, "unknown model type: x");
    assert_eq!(failure.to_string(), "unknown-model-type: unknown model type: x");
}

// ============================================================================
// SECTION: Writes
// ============================================================================

#[test]
fn put_config_writes_json_with_metadata_tags() {
    let store = InMemoryObjectStore::with_bucket(BUCKET);
    let (config_store, _) = connected(&store);
    let key = config_store.put_config("retriever", None).expect("put");
    assert_eq!(key, "models/retriever/model_config.json");

    let stored = store.object(BUCKET, &key).expect("stored object");
    assert_eq!(stored.content_type.as_deref(), Some(JSON_CONTENT_TYPE));
    assert_eq!(stored.metadata.get(METADATA_MODEL_TYPE).map(String::as_str), Some("retriever"));
    assert_eq!(stored.metadata.get(METADATA_UPLOADED_BY).map(String::as_str), Some("pydev369"));
    assert_eq!(stored.metadata.get("hackathon").map(String::as_str), Some("nvidia-agentic-app"));
    let text = String::from_utf8(stored.bytes).expect("utf-8");
    assert!(text.contains('\n'), "documents are pretty-printed");
}

#[test]
fn put_lock_stamps_owner_and_overwrites() {
    let store = InMemoryObjectStore::with_bucket(BUCKET);
    let (config_store, _) = connected(&store);
    config_store.put_lock("deploy-1", object(json!({"status": "initializing"}))).expect("first");
    let key = config_store.put_lock("deploy-1", object(json!({"status": "ready"}))).expect("second");

    let stored = store.object(BUCKET, &key).expect("stored lock");
    let record = LockRecord::from_json_slice(&stored.bytes).expect("lock record");
    assert_eq!(record.get("status"), Some(&json!("ready")));
    assert_eq!(record.get(FIELD_LOCK_OWNER), Some(&json!("pydev369")));
    assert_eq!(record.deployment_id(), Some("deploy-1"));
}

#[test]
fn acquire_lock_reports_held_at_warning_level() {
    let store = InMemoryObjectStore::with_bucket(BUCKET);
    let (config_store, sink) = connected(&store);
    let first = config_store.acquire_lock("deploy-2", Map::new()).expect("first");
    assert_eq!(first, LockAcquisition::Acquired("locks/deploy-2.json".to_string()));
    let second = config_store.acquire_lock("deploy-2", Map::new()).expect("second");
    assert_eq!(second, LockAcquisition::AlreadyHeld);
    assert!(sink.at_level(DiagnosticLevel::Error).is_empty());
    assert_eq!(sink.at_level(DiagnosticLevel::Warning).len(), 1);
}

// ============================================================================
// SECTION: Reads
// ============================================================================

#[test]
fn get_config_rejects_oversized_documents() {
    let store = InMemoryObjectStore::with_bucket(BUCKET);
    store.insert_raw(BUCKET, "models/llm/model_config.json", vec![b' '; MAX_DOCUMENT_BYTES + 1]);
    let (config_store, _) = connected(&store);
    let failure = config_store.get_config("llm").expect_err("too large");
    assert_eq!(failure.kind, FailureKind::TooLarge);
}

#[test]
fn get_config_reports_parse_errors() {
    let store = InMemoryObjectStore::with_bucket(BUCKET);
    store.insert_raw(BUCKET, "models/llm/model_config.json", b"not json".to_vec());
    let (config_store, sink) = connected(&store);
    let failure = config_store.get_config("llm").expect_err("parse failure");
    assert_eq!(failure.kind, FailureKind::ParseError);
    let errors = sink.at_level(DiagnosticLevel::Error);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, Some("parse-error"));
    assert_eq!(errors[0].key.as_deref(), Some("models/llm/model_config.json"));
}

#[test]
fn get_config_rejects_non_object_json() {
    let store = InMemoryObjectStore::with_bucket(BUCKET);
    store.insert_raw(BUCKET, "models/llm/model_config.json", b"[1, 2]".to_vec());
    let (config_store, _) = connected(&store);
    let failure = config_store.get_config("llm").expect_err("not an object");
    assert_eq!(failure.kind, FailureKind::ParseError);
}

#[test]
fn missing_config_is_logged_as_warning_not_error() {
    let store = InMemoryObjectStore::with_bucket(BUCKET);
    let (config_store, sink) = connected(&store);
    assert_eq!(config_store.get_config("llm").expect("lookup"), ConfigLookup::NotFound);
    assert!(sink.at_level(DiagnosticLevel::Error).is_empty());
    assert_eq!(sink.at_level(DiagnosticLevel::Warning).len(), 1);
}

#[test]
fn list_configs_skips_non_json_keys() {
    let store = InMemoryObjectStore::with_bucket(BUCKET);
    store.insert_raw(BUCKET, "models/llm/model_config.json", b"{}".to_vec());
    store.insert_raw(BUCKET, "models/llm/weights.bin", vec![0]);
    store.insert_raw(BUCKET, "locks/deploy-1.json", b"{}".to_vec());
    let (config_store, _) = connected(&store);
    assert_eq!(config_store.list_configs(""), vec!["models/llm/model_config.json".to_string()]);
    assert_eq!(config_store.list_configs("ll"), vec!["models/llm/model_config.json".to_string()]);
    assert!(config_store.list_configs("retriever/").is_empty());
}

#[test]
fn list_configs_rejects_traversal_without_store_call() {
    let store = InMemoryObjectStore::with_bucket(BUCKET);
    let (config_store, _) = connected(&store);
    let before = store.request_count();
    assert!(config_store.list_configs("../locks").is_empty());
    assert_eq!(store.request_count(), before);
}

// ============================================================================
// SECTION: Faults
// ============================================================================

#[test]
fn faults_after_connect_are_reported_per_operation() {
    let store = InMemoryObjectStore::with_bucket(BUCKET);
    let (config_store, sink) = connected(&store);
    store.set_fault(BUCKET, Some(ObjectStoreError::AccessDenied("denied".into())));

    let failure = config_store.put_config("llm", None).expect_err("denied");
    assert_eq!(failure.kind, FailureKind::AccessDenied);
    assert!(!config_store.lock_exists("deploy-1"));
    assert!(config_store.list_configs("").is_empty());
    let kinds: Vec<_> =
        sink.at_level(DiagnosticLevel::Error).into_iter().filter_map(|event| event.kind).collect();
    assert_eq!(kinds, vec!["access-denied", "access-denied", "access-denied"]);
}

#[test]
fn access_denied_probe_marks_store_unavailable() {
    let store = InMemoryObjectStore::with_bucket(BUCKET);
    store.set_fault(BUCKET, Some(ObjectStoreError::AccessDenied("denied".into())));
    let (config_store, _) = connected(&store);
    assert_eq!(
        config_store.readiness(),
        Readiness::Unavailable(UnavailableReason::AccessDenied)
    );
    let failure = config_store.put_lock("deploy-1", Map::new()).expect_err("not ready");
    assert_eq!(failure.kind, FailureKind::NotReady);
}
