// crates/model-store-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payloads.
// Purpose: Deterministic examples for docs and tooling.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example `model-store.toml`. The example mirrors the built-in
//! defaults and is validated by the crate's integration tests.

/// Returns a canonical example `model-store.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"catalog_mode = "extend"

[store]
provider = "s3"
bucket = "nvidia-models-pydev369"
region = "us-east-1"
request_timeout_ms = 30000
# endpoint = "https://s3.example.com"
# force_path_style = false
# allow_http = false

[document]
version = "1.0"
environment = "hackathon"
owner = "pydev369"

[document.metadata]
hackathon = "nvidia-agentic-app"

[diagnostics]
destination = "both"
path = "logs/model-store.log"
min_level = "info"
max_file_bytes = 10485760

[models.reranker]
display_name = "llama-3_2-nemoretriever-500m-rerank-v2"
storage_prefix = "models/reranker/"
config_file = "model_config.json"
source_url = "https://build.nvidia.com/nvidia/llama-3_2-nemoretriever-500m-rerank-v2"

[models.reranker.defaults]
parameters = "500M"
architecture = "Reranker"
nim_compatible = true
deployment = { instance_type = "cpu", gpu_required = false, container_image = "nvcr.io/nvidia/nim:latest" }
"#,
    )
}
