//! Config load validation tests for model-store-config.
// crates/model-store-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding, schema).
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

use std::io::Write;
use std::path::Path;

use model_store_config::CatalogMode;
use model_store_config::ConfigError;
use model_store_config::DiagnosticsDestination;
use model_store_config::ModelStoreConfig;
use model_store_config::config_toml_example;
use model_store_core::DiagnosticLevel;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<ModelStoreConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

fn write_config(contents: &str) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(contents.as_bytes()).map_err(|err| err.to_string())?;
    Ok(file)
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    assert_invalid(ModelStoreConfig::load(Some(Path::new(&long_path))), "config path exceeds max length")
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    assert_invalid(
        ModelStoreConfig::load(Some(Path::new(&long_component))),
        "config path component too long",
    )
}

#[test]
fn load_rejects_missing_explicit_file() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("absent.toml");
    assert_invalid(ModelStoreConfig::load(Some(&path)), "config io error")
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let payload = vec![b'#'; 1_048_577];
    file.write_all(&payload).map_err(|err| err.to_string())?;
    assert_invalid(ModelStoreConfig::load(Some(file.path())), "config file exceeds size limit")
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(&[0xFF, 0xFE, 0xFF]).map_err(|err| err.to_string())?;
    assert_invalid(ModelStoreConfig::load(Some(file.path())), "config file must be utf-8")
}

#[test]
fn load_rejects_unknown_fields() -> TestResult {
    let file = write_config("[store]\nbucket = \"b\"\nbucket_typo = true\n")?;
    assert_invalid(ModelStoreConfig::load(Some(file.path())), "config parse error")
}

#[test]
fn load_rejects_empty_bucket() -> TestResult {
    let file = write_config("[store]\nbucket = \"  \"\n")?;
    assert_invalid(ModelStoreConfig::load(Some(file.path())), "store.bucket must be set")
}

#[test]
fn load_rejects_unsafe_catalog_prefix() -> TestResult {
    let file = write_config(
        "[models.evil]\ndisplay_name = \"Evil\"\nstorage_prefix = \"../locks/\"\n",
    )?;
    assert_invalid(ModelStoreConfig::load(Some(file.path())), "models:")
}

#[test]
fn load_applies_defaults_for_empty_file() -> TestResult {
    let file = write_config("")?;
    let config = ModelStoreConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config.store.bucket != "nvidia-models-pydev369" || config.store.region != "us-east-1" {
        return Err("expected default bucket and region".to_string());
    }
    if config.document.owner != "pydev369" || config.document.environment != "hackathon" {
        return Err("expected default document settings".to_string());
    }
    if config.source.as_deref() != Some(file.path()) {
        return Err("expected source path to be recorded".to_string());
    }
    let catalog = config.catalog().map_err(|err| err.to_string())?;
    if !catalog.contains("llm") || !catalog.contains("retriever") {
        return Err("expected built-in catalog".to_string());
    }
    Ok(())
}

#[test]
fn replace_mode_drops_builtin_entries() -> TestResult {
    let file = write_config(
        "[models.embedder]\ndisplay_name = \"Embedder\"\nstorage_prefix = \"models/embedder/\"\n",
    )?;
    let config = ModelStoreConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config.catalog_mode != CatalogMode::Replace {
        return Err("expected replace mode by default".to_string());
    }
    let catalog = config.catalog().map_err(|err| err.to_string())?;
    let ids: Vec<&str> = catalog.model_types().collect();
    if ids != vec!["embedder"] {
        return Err(format!("unexpected catalog ids {ids:?}"));
    }
    Ok(())
}

#[test]
fn example_config_parses_and_extends_catalog() -> TestResult {
    let config =
        ModelStoreConfig::from_toml_str(&config_toml_example()).map_err(|err| err.to_string())?;
    if config.diagnostics.destination != DiagnosticsDestination::Both {
        return Err("expected both diagnostics destinations".to_string());
    }
    if config.diagnostics.min_level != DiagnosticLevel::Info {
        return Err("expected info min level".to_string());
    }
    let catalog = config.catalog().map_err(|err| err.to_string())?;
    let reranker = catalog.resolve("reranker").map_err(|err| err.to_string())?;
    if reranker.defaults.get("parameters") != Some(&serde_json::json!("500M")) {
        return Err("expected reranker defaults to carry parameters".to_string());
    }
    if catalog.len() != 3 {
        return Err(format!("expected 3 catalog entries, got {}", catalog.len()));
    }
    Ok(())
}
