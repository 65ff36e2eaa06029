// crates/model-store-core/src/keys.rs
// ============================================================================
// Module: Object Key Derivation
// Description: Deterministic object keys for config documents and lock records.
// Purpose: Keep every stored key relative, bounded, and traversal free.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Config documents live at `<storage_prefix><config_file>` (for the built-in
//! catalog, `models/<model_type>/model_config.json`) and lock records at
//! `locks/<deployment_id>.json`. Every segment that reaches the object store
//! is validated here first; callers and stored data are untrusted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Component;
use std::path::Path;

use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Root prefix under which all config documents are stored.
pub const CONFIG_ROOT_PREFIX: &str = "models/";
/// Default file name for a model config document.
pub const DEFAULT_CONFIG_FILE: &str = "model_config.json";
/// Suffix shared by every config and lock object.
pub const JSON_SUFFIX: &str = ".json";
/// Prefix under which lock records are stored.
pub const LOCK_PREFIX: &str = "locks/";
/// Maximum length of a single key segment.
pub const MAX_KEY_SEGMENT_LENGTH: usize = 255;
/// Maximum total key length (S3 object key limit).
pub const MAX_KEY_LENGTH: usize = 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while deriving or validating object keys.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// The key or segment is structurally invalid.
    #[error("invalid object key: {0}")]
    Invalid(String),
    /// The key exceeds the maximum length.
    #[error("object key exceeds length limit ({actual} > {max})")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
        /// Actual length.
        actual: usize,
    },
}

// ============================================================================
// SECTION: Key Derivation
// ============================================================================

/// Builds the config document key from a storage prefix and file name.
///
/// # Errors
///
/// Returns [`KeyError`] when the prefix or file name is unsafe.
pub fn config_key(storage_prefix: &str, config_file: &str) -> Result<String, KeyError> {
    let prefix = normalize_prefix(storage_prefix)?;
    validate_segment(config_file)?;
    let key = format!("{prefix}{config_file}");
    check_length(&key)?;
    Ok(key)
}

/// Builds the lock record key for a deployment identifier.
///
/// # Errors
///
/// Returns [`KeyError`] when the deployment identifier is not a single safe segment.
pub fn lock_key(deployment_id: &str) -> Result<String, KeyError> {
    validate_segment(deployment_id)?;
    let key = format!("{LOCK_PREFIX}{deployment_id}{JSON_SUFFIX}");
    check_length(&key)?;
    Ok(key)
}

/// Builds the listing prefix for config documents below the config root.
///
/// An empty `relative`, `models`, or `models/` lists the whole config root.
/// A single leading `models/` is accepted and stripped.
///
/// # Errors
///
/// Returns [`KeyError`] when the relative prefix escapes the config root.
pub fn config_list_prefix(relative: &str) -> Result<String, KeyError> {
    let relative = relative.trim();
    let root = CONFIG_ROOT_PREFIX.trim_end_matches('/');
    let trimmed = if relative == root {
        ""
    } else {
        relative.strip_prefix(CONFIG_ROOT_PREFIX).unwrap_or(relative)
    };
    if trimmed.is_empty() {
        return Ok(CONFIG_ROOT_PREFIX.to_string());
    }
    // A partial trailing segment ("ll") is a valid listing prefix, so only the
    // structure is checked, not the trailing slash.
    let without_slash = trimmed.strip_suffix('/').unwrap_or(trimmed);
    validate_relative_path(without_slash)?;
    let key = format!("{CONFIG_ROOT_PREFIX}{trimmed}");
    check_length(&key)?;
    Ok(key)
}

/// Normalizes a storage prefix into `segment/.../` form.
///
/// # Errors
///
/// Returns [`KeyError`] when the prefix is empty, absolute, or traverses.
pub fn normalize_prefix(raw: &str) -> Result<String, KeyError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(KeyError::Invalid("storage prefix must be set".to_string()));
    }
    if trimmed.starts_with('/') {
        return Err(KeyError::Invalid("prefix must be relative (no leading slash)".to_string()));
    }
    let normalized = trimmed.strip_suffix('/').unwrap_or(trimmed);
    validate_relative_path(normalized)?;
    Ok(format!("{normalized}/"))
}

// ============================================================================
// SECTION: Validation Helpers
// ============================================================================

/// Validates a relative, slash-separated key path.
///
/// # Errors
///
/// Returns [`KeyError`] for empty, absolute, or traversing paths.
pub fn validate_relative_path(path: &str) -> Result<(), KeyError> {
    if path.is_empty() {
        return Err(KeyError::Invalid("path must be set".to_string()));
    }
    if path.contains('\\') {
        return Err(KeyError::Invalid("path must not contain backslashes".to_string()));
    }
    check_length(path)?;
    let candidate = Path::new(path);
    if candidate.is_absolute() {
        return Err(KeyError::Invalid("path must be relative".to_string()));
    }
    for component in candidate.components() {
        match component {
            Component::Normal(value) => validate_segment(&value.to_string_lossy())?,
            _ => {
                return Err(KeyError::Invalid(
                    "path must be relative without traversal".to_string(),
                ));
            }
        }
    }
    Ok(())
}

/// Validates a single key segment.
///
/// # Errors
///
/// Returns [`KeyError`] when the segment is empty, a dot segment, too long,
/// or contains separators or control characters.
pub fn validate_segment(value: &str) -> Result<(), KeyError> {
    if value.is_empty() || value == "." || value == ".." {
        return Err(KeyError::Invalid(format!("segment '{value}' is invalid")));
    }
    if value.len() > MAX_KEY_SEGMENT_LENGTH {
        return Err(KeyError::Invalid("segment exceeds length limit".to_string()));
    }
    if value.contains(['/', '\\']) || value.chars().any(char::is_control) {
        return Err(KeyError::Invalid(format!("segment '{value}' contains invalid characters")));
    }
    Ok(())
}

/// Rejects keys longer than [`MAX_KEY_LENGTH`].
const fn check_length(key: &str) -> Result<(), KeyError> {
    if key.len() > MAX_KEY_LENGTH {
        return Err(KeyError::TooLong {
            max: MAX_KEY_LENGTH,
            actual: key.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests;
