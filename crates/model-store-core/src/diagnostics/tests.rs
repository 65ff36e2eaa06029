// crates/model-store-core/src/diagnostics/tests.rs
// ============================================================================
// Module: Diagnostics Tests
// Description: Unit tests for diagnostic sinks and level filtering.
// Dependencies: model-store-core, serde_json
// ============================================================================

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use std::sync::Arc;

use super::*;

#[test]
fn levels_are_ordered_by_severity() {
    assert!(DiagnosticLevel::Debug < DiagnosticLevel::Info);
    assert!(DiagnosticLevel::Info < DiagnosticLevel::Warning);
    assert!(DiagnosticLevel::Warning < DiagnosticLevel::Error);
    assert!(DiagnosticLevel::Error < DiagnosticLevel::Critical);
}

#[test]
fn level_filter_drops_events_below_minimum() {
    let capture = Arc::new(MemoryDiagnosticSink::new());
    let filter = LevelFilterSink::new(DiagnosticLevel::Warning, capture.clone());
    filter.record(&DiagnosticEvent::new(DiagnosticLevel::Debug, "test", "debug"));
    filter.record(&DiagnosticEvent::new(DiagnosticLevel::Info, "test", "info"));
    filter.record(&DiagnosticEvent::new(DiagnosticLevel::Warning, "test", "warning"));
    filter.record(&DiagnosticEvent::new(DiagnosticLevel::Critical, "test", "critical"));
    let messages: Vec<String> = capture.events().into_iter().map(|event| event.message).collect();
    assert_eq!(messages, vec!["warning".to_string(), "critical".to_string()]);
}

#[test]
fn fanout_reaches_every_sink() {
    let first = Arc::new(MemoryDiagnosticSink::new());
    let second = Arc::new(MemoryDiagnosticSink::new());
    let fanout = FanoutSink::new(vec![
        first.clone() as Arc<dyn DiagnosticSink>,
        second.clone() as Arc<dyn DiagnosticSink>,
    ]);
    fanout.record(&DiagnosticEvent::new(DiagnosticLevel::Error, "test", "boom"));
    assert_eq!(first.events().len(), 1);
    assert_eq!(second.at_level(DiagnosticLevel::Error).len(), 1);
}

#[test]
fn event_serializes_as_single_json_line() {
    let event = DiagnosticEvent::new(DiagnosticLevel::Warning, "get_config", "not found")
        .with_key("models/llm/model_config.json")
        .with_kind("key_not_found");
    let line = serde_json::to_string(&event).unwrap();
    assert!(!line.contains('\n'));
    let value: serde_json::Value = serde_json::from_str(&line).unwrap();
    assert_eq!(value["level"], "warning");
    assert_eq!(value["operation"], "get_config");
    assert_eq!(value["key"], "models/llm/model_config.json");
    assert_eq!(value["kind"], "key_not_found");
}

#[test]
fn optional_fields_are_omitted() {
    let event = DiagnosticEvent::new(DiagnosticLevel::Info, "connect", "ready");
    let value = serde_json::to_value(&event).unwrap();
    assert!(value.get("key").is_none());
    assert!(value.get("kind").is_none());
}

#[test]
fn file_sink_appends_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("diagnostics.log");
    let sink = FileDiagnosticSink::new(&path).unwrap();
    sink.record(&DiagnosticEvent::new(DiagnosticLevel::Info, "put_config", "one"));
    sink.record(&DiagnosticEvent::new(DiagnosticLevel::Error, "put_config", "two"));
    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains("\"level\":\"error\""));
}

#[test]
fn file_sink_rotates_at_size_cap() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("diagnostics.log");
    let event = DiagnosticEvent::new(DiagnosticLevel::Info, "put_config", "uploaded");
    let line_len = u64::try_from(serde_json::to_string(&event).unwrap().len() + 1).unwrap();
    let sink = FileDiagnosticSink::with_size_cap(&path, line_len * 2).unwrap();
    sink.record(&event);
    sink.record(&event);
    sink.record(&event);
    let current = std::fs::read_to_string(&path).unwrap();
    let rotated = std::fs::read_to_string(FileDiagnosticSink::rotated_path(&path)).unwrap();
    assert_eq!(current.lines().count(), 1);
    assert_eq!(rotated.lines().count(), 2);
}

#[test]
fn file_sink_counts_existing_bytes_toward_cap() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("diagnostics.log");
    std::fs::write(&path, "x".repeat(64)).unwrap();
    let sink = FileDiagnosticSink::with_size_cap(&path, 65).unwrap();
    sink.record(&DiagnosticEvent::new(DiagnosticLevel::Error, "lock_exists", "fresh"));
    let rotated = std::fs::read_to_string(FileDiagnosticSink::rotated_path(&path)).unwrap();
    assert_eq!(rotated, "x".repeat(64));
    let current = std::fs::read_to_string(&path).unwrap();
    assert!(current.contains("\"message\":\"fresh\""));
}
