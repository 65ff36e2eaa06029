// crates/model-store-config/src/config.rs
// ============================================================================
// Module: Model Store Configuration
// Description: Configuration loading and validation for the model store.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: model-store-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! An explicitly named file (CLI flag or `MODEL_STORE_CONFIG`) must exist;
//! when neither is given and `model-store.toml` is absent from the working
//! directory, built-in defaults apply. Invalid configuration fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use model_store_core::DiagnosticLevel;
use model_store_core::DocumentSettings;
use model_store_core::ModelTypeCatalog;
use model_store_core::ModelTypeEntry;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "model-store.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "MODEL_STORE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default bucket holding config documents and locks.
pub const DEFAULT_BUCKET: &str = "nvidia-models-pydev369";
/// Default bucket region.
pub const DEFAULT_REGION: &str = "us-east-1";
/// Default object-store request timeout in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
/// Minimum object-store request timeout in milliseconds.
pub(crate) const MIN_REQUEST_TIMEOUT_MS: u64 = 100;
/// Maximum object-store request timeout in milliseconds.
pub(crate) const MAX_REQUEST_TIMEOUT_MS: u64 = 300_000;
/// Maximum bucket name length (S3 naming rules).
pub(crate) const MAX_BUCKET_NAME_LENGTH: usize = 63;
/// Default diagnostics log file used by the `file` destination.
pub const DEFAULT_DIAGNOSTICS_PATH: &str = "logs/model-store.log";
/// Default size at which the diagnostics log file is rotated.
pub const DEFAULT_DIAGNOSTICS_MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Model store configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelStoreConfig {
    /// How `[models.*]` entries combine with the built-in catalog.
    #[serde(default)]
    pub catalog_mode: CatalogMode,
    /// Object-store connection settings.
    #[serde(default)]
    pub store: ObjectStoreConfig,
    /// Base fields stamped onto generated documents.
    #[serde(default)]
    pub document: DocumentSettings,
    /// Diagnostic sink configuration.
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
    /// Model-type catalog entries keyed by identifier.
    #[serde(default)]
    pub models: BTreeMap<String, ModelTypeEntry>,
    /// Path the configuration was loaded from, if any (not serialized).
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl ModelStoreConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        let is_implicit = matches!(resolved, ResolvedPath::Default(_));
        let resolved = resolved.into_path();
        validate_path(&resolved)?;
        if is_implicit && !resolved.exists() {
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config = Self::from_toml_str(content)?;
        config.source = Some(resolved);
        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.store.validate()?;
        validate_document(&self.document)?;
        self.diagnostics.validate()?;
        self.catalog()?;
        Ok(())
    }

    /// Builds the model-type catalog described by this configuration.
    ///
    /// With no `[models.*]` entries the built-in catalog is used.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a configured entry is unsafe.
    pub fn catalog(&self) -> Result<ModelTypeCatalog, ConfigError> {
        if self.models.is_empty() {
            return Ok(ModelTypeCatalog::builtin());
        }
        let catalog = match self.catalog_mode {
            CatalogMode::Replace => ModelTypeCatalog::new(self.models.clone()),
            CatalogMode::Extend => ModelTypeCatalog::builtin().extended(self.models.clone()),
        }
        .map_err(|err| ConfigError::Invalid(format!("models: {err}")))?;
        Ok(catalog)
    }
}

/// Combination rule for configured catalog entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogMode {
    /// Configured entries replace the built-in catalog.
    #[default]
    Replace,
    /// Configured entries are layered over the built-in catalog.
    Extend,
}

/// Supported object-store providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectStoreProvider {
    /// Amazon S3 compatible object storage.
    #[default]
    S3,
}

/// Object-store configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectStoreConfig {
    /// Provider selection for the object store.
    #[serde(default)]
    pub provider: ObjectStoreProvider,
    /// Bucket name holding config documents and locks.
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// Bucket region.
    #[serde(default = "default_region")]
    pub region: String,
    /// Optional object-store endpoint (S3-compatible).
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Force path-style addressing (S3-compatible).
    #[serde(default)]
    pub force_path_style: bool,
    /// Allow non-TLS endpoints (explicit opt-in).
    #[serde(default)]
    pub allow_http: bool,
    /// Per-operation request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self {
            provider: ObjectStoreProvider::S3,
            bucket: default_bucket(),
            region: default_region(),
            endpoint: None,
            force_path_style: false,
            allow_http: false,
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl ObjectStoreConfig {
    /// Validates object-store configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when object-store settings are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bucket = self.bucket.trim();
        if bucket.is_empty() {
            return Err(ConfigError::Invalid("store.bucket must be set".to_string()));
        }
        if bucket.len() > MAX_BUCKET_NAME_LENGTH || bucket.contains(['/', '\\']) {
            return Err(ConfigError::Invalid("store.bucket is not a valid bucket name".to_string()));
        }
        if self.region.trim().is_empty() {
            return Err(ConfigError::Invalid("store.region must be set".to_string()));
        }
        if let Some(endpoint) = &self.endpoint {
            let trimmed = endpoint.trim();
            if !(trimmed.starts_with("https://") || trimmed.starts_with("http://")) {
                return Err(ConfigError::Invalid(
                    "store.endpoint must include http:// or https://".to_string(),
                ));
            }
            if trimmed.starts_with("http://") && !self.allow_http {
                return Err(ConfigError::Invalid(
                    "store.endpoint uses http:// without allow_http".to_string(),
                ));
            }
        }
        if !(MIN_REQUEST_TIMEOUT_MS ..= MAX_REQUEST_TIMEOUT_MS).contains(&self.request_timeout_ms)
        {
            return Err(ConfigError::Invalid(format!(
                "store.request_timeout_ms must be between {MIN_REQUEST_TIMEOUT_MS} and \
                 {MAX_REQUEST_TIMEOUT_MS}"
            )));
        }
        Ok(())
    }
}

/// Destination for diagnostic events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticsDestination {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to `diagnostics.path`.
    File,
    /// Both stderr and the log file.
    Both,
    /// Diagnostics are discarded.
    None,
}

/// Diagnostic sink configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiagnosticsConfig {
    /// Where diagnostic events are written.
    #[serde(default)]
    pub destination: DiagnosticsDestination,
    /// Log file path for file destinations.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Minimum level recorded.
    #[serde(default)]
    pub min_level: DiagnosticLevel,
    /// Log file size that triggers rotation to `<path>.1`.
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            destination: DiagnosticsDestination::default(),
            path: None,
            min_level: DiagnosticLevel::default(),
            max_file_bytes: DEFAULT_DIAGNOSTICS_MAX_FILE_BYTES,
        }
    }
}

impl DiagnosticsConfig {
    /// Returns the log file path for file destinations.
    #[must_use]
    pub fn file_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_DIAGNOSTICS_PATH))
    }

    /// Validates diagnostics configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid("diagnostics.path must be non-empty".to_string()));
            }
            validate_path(path)?;
        }
        if self.max_file_bytes == 0 {
            return Err(ConfigError::Invalid(
                "diagnostics.max_file_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Config path with its resolution origin.
enum ResolvedPath {
    /// Supplied by the caller or the environment.
    Explicit(PathBuf),
    /// Fallback default file name.
    Default(PathBuf),
}

impl ResolvedPath {
    /// Returns the resolved path.
    fn into_path(self) -> PathBuf {
        match self {
            Self::Explicit(path) | Self::Default(path) => path,
        }
    }
}

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<ResolvedPath, ConfigError> {
    if let Some(path) = path {
        return Ok(ResolvedPath::Explicit(path.to_path_buf()));
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(ResolvedPath::Explicit(PathBuf::from(env_path)));
    }
    Ok(ResolvedPath::Default(PathBuf::from(DEFAULT_CONFIG_NAME)))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates document base-field settings.
fn validate_document(settings: &DocumentSettings) -> Result<(), ConfigError> {
    for (field, value) in [
        ("document.version", &settings.version),
        ("document.environment", &settings.environment),
        ("document.owner", &settings.owner),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
        }
    }
    for name in settings.metadata.keys() {
        // S3 user metadata names travel as HTTP header suffixes.
        let valid = !name.is_empty()
            && name.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
        if !valid {
            return Err(ConfigError::Invalid(format!(
                "document.metadata key '{name}' must be ascii alphanumeric, '-' or '_'"
            )));
        }
    }
    Ok(())
}

/// Default bucket name used by serde.
fn default_bucket() -> String {
    DEFAULT_BUCKET.to_string()
}

/// Default region used by serde.
fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

/// Default diagnostics rotation size used by serde.
const fn default_max_file_bytes() -> u64 {
    DEFAULT_DIAGNOSTICS_MAX_FILE_BYTES
}

/// Default request timeout used by serde.
const fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions favor direct unwrap/expect for clarity."
    )]

    use super::*;

    #[test]
    fn default_config_validates_with_builtin_catalog() {
        let config = ModelStoreConfig::default();
        config.validate().unwrap();
        assert_eq!(config.store.bucket, DEFAULT_BUCKET);
        assert_eq!(config.store.region, DEFAULT_REGION);
        assert_eq!(config.catalog().unwrap(), ModelTypeCatalog::builtin());
    }

    #[test]
    fn endpoint_requires_scheme_and_http_opt_in() {
        let mut store = ObjectStoreConfig {
            endpoint: Some("minio.local:9000".to_string()),
            ..ObjectStoreConfig::default()
        };
        assert!(store.validate().unwrap_err().to_string().contains("http:// or https://"));
        store.endpoint = Some("http://minio.local:9000".to_string());
        assert!(store.validate().unwrap_err().to_string().contains("allow_http"));
        store.allow_http = true;
        store.validate().unwrap();
    }

    #[test]
    fn request_timeout_bounds_are_enforced() {
        let mut store = ObjectStoreConfig {
            request_timeout_ms: MIN_REQUEST_TIMEOUT_MS - 1,
            ..ObjectStoreConfig::default()
        };
        assert!(store.validate().is_err());
        store.request_timeout_ms = MAX_REQUEST_TIMEOUT_MS + 1;
        assert!(store.validate().is_err());
        store.request_timeout_ms = MAX_REQUEST_TIMEOUT_MS;
        store.validate().unwrap();
    }

    #[test]
    fn bucket_must_be_a_plain_name() {
        let store = ObjectStoreConfig {
            bucket: "bucket/with/slash".to_string(),
            ..ObjectStoreConfig::default()
        };
        assert!(store.validate().is_err());
    }

    #[test]
    fn metadata_keys_must_be_header_safe() {
        let mut config = ModelStoreConfig::default();
        config.document.metadata.insert("bad key".to_string(), "v".to_string());
        assert!(config.validate().unwrap_err().to_string().contains("document.metadata"));
    }

    #[test]
    fn diagnostics_rotation_size_defaults_and_rejects_zero() {
        let mut config = ModelStoreConfig::default();
        assert_eq!(config.diagnostics.max_file_bytes, DEFAULT_DIAGNOSTICS_MAX_FILE_BYTES);
        config.diagnostics.max_file_bytes = 0;
        assert!(config.validate().unwrap_err().to_string().contains("max_file_bytes"));
    }
}
