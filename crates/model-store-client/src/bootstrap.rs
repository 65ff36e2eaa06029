// crates/model-store-client/src/bootstrap.rs
// ============================================================================
// Module: Bootstrap Workflow
// Description: Upload initial configs, lock a deployment, and verify.
// Purpose: Seed a bucket for a fresh deployment in one call.
// Dependencies: crate::store, model-store-core
// ============================================================================

//! ## Overview
//! [`run_bootstrap`] executes a [`BootstrapPlan`] against a connected
//! [`ConfigStore`]: each planned config is uploaded in order, the deployment
//! lock is written, the stored configs are listed, and one config is
//! downloaded back as a read check. Steps after a failed upload still run so
//! the report shows every outcome. A store that is not ready aborts before
//! any step.

// ============================================================================
// SECTION: Imports
// ============================================================================

use model_store_core::DiagnosticLevel;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use time::OffsetDateTime;

use crate::store::ConfigLookup;
use crate::store::ConfigStore;
use crate::store::FailureKind;
use crate::store::StoreFailure;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Cluster name recorded in the default deployment lock.
pub const DEFAULT_CLUSTER: &str = "nvidia-hackathon-cluster";
/// Status recorded in a freshly written deployment lock.
pub const INITIAL_LOCK_STATUS: &str = "initializing";

// ============================================================================
// SECTION: Plan
// ============================================================================

/// One config upload in a bootstrap run.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedUpload {
    /// Model type to upload.
    pub model_type: String,
    /// Extra fields merged over the generated document.
    pub extra: Map<String, Value>,
}

/// Inputs for a bootstrap run.
#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapPlan {
    /// Uploads, in order.
    pub uploads: Vec<PlannedUpload>,
    /// Deployment identifier for the lock.
    pub deployment_id: String,
    /// Cluster name recorded in the lock.
    pub cluster: String,
    /// Model type downloaded back after the uploads.
    pub verify_model_type: String,
}

impl BootstrapPlan {
    /// Returns the standard plan for the built-in catalog.
    ///
    /// The deployment identifier is `deploy-<unix seconds>`.
    #[must_use]
    pub fn standard() -> Self {
        let llm = json!({
            "custom_notes": "Primary reasoning model for agentic workflow",
            "expected_throughput": "100 tokens/sec on T4",
            "api_endpoint": "/v1/chat/completions",
        });
        let retriever = json!({
            "custom_notes": "Embedding model for RAG and validation",
            "embedding_usage": "document retrieval, similarity search",
            "api_endpoint": "/v1/embeddings",
        });
        Self {
            uploads: vec![
                PlannedUpload {
                    model_type: "llm".to_string(),
                    extra: into_object(llm),
                },
                PlannedUpload {
                    model_type: "retriever".to_string(),
                    extra: into_object(retriever),
                },
            ],
            deployment_id: format!("deploy-{}", OffsetDateTime::now_utc().unix_timestamp()),
            cluster: DEFAULT_CLUSTER.to_string(),
            verify_model_type: "llm".to_string(),
        }
    }

    /// Returns the lock payload: planned models, status, and cluster.
    #[must_use]
    pub fn lock_payload(&self) -> Map<String, Value> {
        let models: Vec<Value> =
            self.uploads.iter().map(|upload| Value::from(upload.model_type.as_str())).collect();
        let mut payload = Map::new();
        payload.insert("models".to_string(), Value::Array(models));
        payload.insert("status".to_string(), Value::from(INITIAL_LOCK_STATUS));
        payload.insert("cluster".to_string(), Value::from(self.cluster.as_str()));
        payload
    }
}

/// Unwraps a JSON object literal.
fn into_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

// ============================================================================
// SECTION: Report
// ============================================================================

/// Outcome of one planned upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    /// Model type.
    pub model_type: String,
    /// Stored key, or the failure.
    pub result: Result<String, StoreFailure>,
}

/// Outcome of a bootstrap run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Per-upload outcomes, in plan order.
    pub uploads: Vec<UploadOutcome>,
    /// Deployment identifier used for the lock.
    pub deployment_id: String,
    /// Lock key, or the failure.
    pub lock: Result<String, StoreFailure>,
    /// Config keys listed after the writes.
    pub listed: Vec<String>,
    /// Whether the verification download found the document.
    pub verified: bool,
}

impl BootstrapReport {
    /// Returns true when every upload and the lock write succeeded.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.uploads.iter().all(|upload| upload.result.is_ok()) && self.lock.is_ok()
    }
}

// ============================================================================
// SECTION: Workflow
// ============================================================================

/// Runs `plan` against `store`.
///
/// # Errors
///
/// Returns [`StoreFailure`] with [`FailureKind::NotReady`] when the store is
/// not ready. Individual step failures are reported in the
/// [`BootstrapReport`] instead.
pub fn run_bootstrap(
    store: &ConfigStore,
    plan: &BootstrapPlan,
) -> Result<BootstrapReport, StoreFailure> {
    if !store.readiness().is_ready() {
        return Err(StoreFailure::new(
            FailureKind::NotReady,
            format!("bucket {} unavailable, bootstrap aborted", store.bucket()),
        ));
    }
    let uploads = plan
        .uploads
        .iter()
        .map(|upload| UploadOutcome {
            model_type: upload.model_type.clone(),
            result: store.put_config(&upload.model_type, Some(&upload.extra)),
        })
        .collect();
    let lock = store.put_lock(&plan.deployment_id, plan.lock_payload());
    let listed = store.list_configs("");
    let verified = matches!(store.get_config(&plan.verify_model_type), Ok(ConfigLookup::Found(_)));
    let report = BootstrapReport {
        uploads,
        deployment_id: plan.deployment_id.clone(),
        lock,
        listed,
        verified,
    };
    let (level, message) = if report.succeeded() {
        (DiagnosticLevel::Info, "bootstrap completed")
    } else {
        (DiagnosticLevel::Error, "bootstrap completed with failures")
    };
    store.record(level, "bootstrap", message);
    Ok(report)
}
