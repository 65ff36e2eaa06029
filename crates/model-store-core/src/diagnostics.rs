// crates/model-store-core/src/diagnostics.rs
// ============================================================================
// Module: Diagnostics
// Description: Structured diagnostic events and injectable sinks.
// Purpose: Emit leveled JSON-line diagnostics without process-wide state.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Store operations report progress and failures as [`DiagnosticEvent`]s to
//! an explicitly constructed [`DiagnosticSink`]. Sinks serialize events as
//! JSON lines to stderr or an append-only file with optional size-based
//! rotation. Wrappers filter by minimum level or fan out to several
//! destinations, and a memory sink captures events for tests.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Diagnostic severity, ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticLevel {
    /// Verbose detail (keys, payload sizes).
    Debug,
    /// Normal progress.
    #[default]
    Info,
    /// Expected but noteworthy conditions (first-run absences, held locks).
    Warning,
    /// Operation failures.
    Error,
    /// Workflow-aborting failures.
    Critical,
}

impl DiagnosticLevel {
    /// Returns a stable label for the level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

/// Structured diagnostic event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Severity.
    pub level: DiagnosticLevel,
    /// Operation that produced the event.
    pub operation: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Object key involved, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Failure classification label, when the event reports a failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
}

impl DiagnosticEvent {
    /// Creates a new event stamped with the current time.
    #[must_use]
    pub fn new(level: DiagnosticLevel, operation: &'static str, message: impl Into<String>) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "model_store",
            timestamp_ms,
            level,
            operation,
            message: message.into(),
            key: None,
            kind: None,
        }
    }

    /// Attaches the object key involved.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Attaches a failure classification label.
    #[must_use]
    pub const fn with_kind(mut self, kind: &'static str) -> Self {
        self.kind = Some(kind);
        self
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Destination for diagnostic events.
pub trait DiagnosticSink: Send + Sync {
    /// Records a diagnostic event.
    fn record(&self, event: &DiagnosticEvent);
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Sink that logs JSON lines to stderr.
pub struct StderrDiagnosticSink;

impl DiagnosticSink for StderrDiagnosticSink {
    fn record(&self, event: &DiagnosticEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Sink that logs JSON lines to a file.
///
/// With a size cap, the file is rotated to `<path>.1` before a write would
/// push it past the cap. Only the most recent rotated file is kept.
pub struct FileDiagnosticSink {
    /// Open log file and rotation bookkeeping.
    state: Mutex<FileSinkState>,
}

/// Mutable state behind the file sink lock.
struct FileSinkState {
    /// Log file path.
    path: PathBuf,
    /// File handle used for append-only logging.
    file: File,
    /// Bytes currently in the log file.
    written: u64,
    /// Rotation threshold in bytes.
    max_bytes: Option<u64>,
}

impl FileDiagnosticSink {
    /// Opens the diagnostic log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        Self::open(path, None)
    }

    /// Opens the diagnostic log file, rotating it once it reaches `max_bytes`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn with_size_cap(path: &Path, max_bytes: u64) -> io::Result<Self> {
        Self::open(path, Some(max_bytes))
    }

    /// Returns the path rotated log contents are moved to.
    #[must_use]
    pub fn rotated_path(path: &Path) -> PathBuf {
        let mut rotated = path.as_os_str().to_os_string();
        rotated.push(".1");
        PathBuf::from(rotated)
    }

    /// Opens the file and records its current length.
    fn open(path: &Path, max_bytes: Option<u64>) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            state: Mutex::new(FileSinkState {
                path: path.to_path_buf(),
                file,
                written,
                max_bytes,
            }),
        })
    }
}

impl FileSinkState {
    /// Moves the current file aside and starts a fresh one.
    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        fs::rename(&self.path, FileDiagnosticSink::rotated_path(&self.path))?;
        self.file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        self.written = 0;
        Ok(())
    }

    /// Appends one line, rotating first when the cap would be exceeded.
    fn append(&mut self, line: &str) -> io::Result<()> {
        let len = u64::try_from(line.len()).unwrap_or(u64::MAX).saturating_add(1);
        if let Some(max_bytes) = self.max_bytes
            && self.written > 0
            && self.written.saturating_add(len) > max_bytes
        {
            self.rotate()?;
        }
        writeln!(self.file, "{line}")?;
        self.file.flush()?;
        self.written = self.written.saturating_add(len);
        Ok(())
    }
}

impl DiagnosticSink for FileDiagnosticSink {
    fn record(&self, event: &DiagnosticEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut state) = self.state.lock()
        {
            let _ = state.append(&payload);
        }
    }
}

/// No-op diagnostic sink.
pub struct NoopDiagnosticSink;

impl DiagnosticSink for NoopDiagnosticSink {
    fn record(&self, _event: &DiagnosticEvent) {}
}

/// Sink that drops events below a minimum level.
pub struct LevelFilterSink {
    /// Minimum level forwarded to the inner sink.
    min_level: DiagnosticLevel,
    /// Destination for forwarded events.
    inner: Arc<dyn DiagnosticSink>,
}

impl LevelFilterSink {
    /// Wraps `inner`, forwarding events at or above `min_level`.
    #[must_use]
    pub fn new(min_level: DiagnosticLevel, inner: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            min_level,
            inner,
        }
    }
}

impl DiagnosticSink for LevelFilterSink {
    fn record(&self, event: &DiagnosticEvent) {
        if event.level >= self.min_level {
            self.inner.record(event);
        }
    }
}

/// Sink that forwards every event to several destinations.
pub struct FanoutSink {
    /// Destinations in registration order.
    sinks: Vec<Arc<dyn DiagnosticSink>>,
}

impl FanoutSink {
    /// Creates a fan-out over `sinks`.
    #[must_use]
    pub fn new(sinks: Vec<Arc<dyn DiagnosticSink>>) -> Self {
        Self {
            sinks,
        }
    }
}

impl DiagnosticSink for FanoutSink {
    fn record(&self, event: &DiagnosticEvent) {
        for sink in &self.sinks {
            sink.record(event);
        }
    }
}

/// Sink that captures events in memory.
#[derive(Default)]
pub struct MemoryDiagnosticSink {
    /// Captured events in arrival order.
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl MemoryDiagnosticSink {
    /// Creates an empty capture sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the captured events.
    #[must_use]
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    /// Returns captured events at exactly `level`.
    #[must_use]
    pub fn at_level(&self, level: DiagnosticLevel) -> Vec<DiagnosticEvent> {
        self.events().into_iter().filter(|event| event.level == level).collect()
    }
}

impl DiagnosticSink for MemoryDiagnosticSink {
    fn record(&self, event: &DiagnosticEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

#[cfg(test)]
mod tests;
