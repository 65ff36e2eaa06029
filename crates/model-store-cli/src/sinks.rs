// crates/model-store-cli/src/sinks.rs
// ============================================================================
// Module: Diagnostic Sink Construction
// Description: Builds the diagnostic sink described by `[diagnostics]`.
// Purpose: Route store diagnostics to stderr, a log file, both, or nowhere.
// Dependencies: model-store-config, model-store-core
// ============================================================================

//! ## Overview
//! Translates [`DiagnosticsConfig`] into a concrete sink chain. File
//! destinations create the log directory on first use and rotate the file at
//! `max_file_bytes`. Every chain except
//! `none` is wrapped in a [`LevelFilterSink`] at the configured minimum.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use model_store_config::DiagnosticsConfig;
use model_store_config::DiagnosticsDestination;
use model_store_core::DiagnosticSink;
use model_store_core::FanoutSink;
use model_store_core::FileDiagnosticSink;
use model_store_core::LevelFilterSink;
use model_store_core::NoopDiagnosticSink;
use model_store_core::StderrDiagnosticSink;

/// Builds the configured diagnostic sink.
///
/// # Errors
///
/// Returns an I/O error when the log directory or file cannot be opened.
pub(crate) fn build_sink(config: &DiagnosticsConfig) -> io::Result<Arc<dyn DiagnosticSink>> {
    let inner: Arc<dyn DiagnosticSink> = match config.destination {
        DiagnosticsDestination::None => return Ok(Arc::new(NoopDiagnosticSink)),
        DiagnosticsDestination::Stderr => Arc::new(StderrDiagnosticSink),
        DiagnosticsDestination::File => {
            open_file_sink(&config.file_path(), config.max_file_bytes)?
        }
        DiagnosticsDestination::Both => Arc::new(FanoutSink::new(vec![
            Arc::new(StderrDiagnosticSink) as Arc<dyn DiagnosticSink>,
            open_file_sink(&config.file_path(), config.max_file_bytes)?,
        ])),
    };
    Ok(Arc::new(LevelFilterSink::new(config.min_level, inner)))
}

/// Opens a size-capped file sink, creating parent directories.
fn open_file_sink(path: &Path, max_bytes: u64) -> io::Result<Arc<dyn DiagnosticSink>> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(Arc::new(FileDiagnosticSink::with_size_cap(path, max_bytes)?))
}
