// crates/model-store-cli/src/main.rs
// ============================================================================
// Module: Model Store CLI Entry Point
// Description: Command dispatcher for config, lock, and bootstrap workflows.
// Purpose: Drive the config store against a configured bucket.
// Dependencies: clap, model-store-client, model-store-config, model-store-core
// ============================================================================

//! ## Overview
//! The `model-store` binary loads `model-store.toml` (or built-in defaults),
//! applies command-line overrides for the bucket, region, and endpoint, and
//! runs one config store operation per invocation. Results go to stdout;
//! structured diagnostics go wherever `[diagnostics]` points. Inputs from the
//! command line and from files are size-limited before parsing.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod sinks;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use model_store_client::BootstrapPlan;
use model_store_client::BootstrapReport;
use model_store_client::ConfigLookup;
use model_store_client::ConfigStore;
use model_store_client::LockAcquisition;
use model_store_client::Readiness;
use model_store_client::run_bootstrap;
use model_store_client::store::MAX_DOCUMENT_BYTES;
use model_store_config::ModelStoreConfig;
use model_store_config::config_toml_example;
use model_store_core::DiagnosticLevel;
use model_store_core::DiagnosticSink;
use model_store_core::ModelTypeCatalog;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::sinks::build_sink;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a JSON input (inline or file).
const MAX_JSON_INPUT_BYTES: usize = MAX_DOCUMENT_BYTES;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "model-store", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Store and config overrides shared by every command.
    #[command(flatten)]
    store: StoreArgs,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Global config and store overrides.
#[derive(Args, Debug)]
struct StoreArgs {
    /// Config file path (defaults to model-store.toml or `MODEL_STORE_CONFIG`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Bucket name override.
    #[arg(long, value_name = "BUCKET", global = true)]
    bucket: Option<String>,
    /// Bucket region override.
    #[arg(long, value_name = "REGION", global = true)]
    region: Option<String>,
    /// S3-compatible endpoint override.
    #[arg(long, value_name = "URL", global = true)]
    endpoint: Option<String>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Connect to the bucket and report readiness.
    Check,
    /// Config document operations.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Deployment lock operations.
    Lock {
        /// Selected lock subcommand.
        #[command(subcommand)]
        command: LockCommand,
    },
    /// Print the model-type catalog as JSON.
    Catalog,
    /// Upload initial configs, lock a deployment, and verify.
    Bootstrap(BootstrapCommand),
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Upload the config document for a model type.
    Put(ConfigPutCommand),
    /// Print the stored config document for a model type.
    Get(ConfigGetCommand),
    /// List stored config document keys.
    List(ConfigListCommand),
    /// Validate the configuration file.
    Validate,
    /// Print an example configuration file.
    Example,
}

/// Lock subcommands.
#[derive(Subcommand, Debug)]
enum LockCommand {
    /// Write a lock unconditionally.
    Put(LockWriteCommand),
    /// Write a lock only if none exists.
    Acquire(LockWriteCommand),
    /// Report whether a lock exists.
    Check(LockCheckCommand),
}

/// Arguments for `config put`.
#[derive(Args, Debug)]
struct ConfigPutCommand {
    /// Model type identifier from the catalog.
    #[arg(value_name = "MODEL_TYPE")]
    model_type: String,
    /// Extra fields as an inline JSON object.
    #[arg(long, value_name = "JSON", conflicts_with = "extra_file")]
    extra: Option<String>,
    /// Extra fields read from a JSON object file.
    #[arg(long = "extra-file", value_name = "PATH")]
    extra_file: Option<PathBuf>,
}

/// Arguments for `config get`.
#[derive(Args, Debug)]
struct ConfigGetCommand {
    /// Model type identifier from the catalog.
    #[arg(value_name = "MODEL_TYPE")]
    model_type: String,
}

/// Arguments for `config list`.
#[derive(Args, Debug)]
struct ConfigListCommand {
    /// Prefix below `models/` to filter on.
    #[arg(long, value_name = "PREFIX", default_value = "")]
    prefix: String,
}

/// Arguments for `lock put` and `lock acquire`.
#[derive(Args, Debug)]
struct LockWriteCommand {
    /// Deployment identifier.
    #[arg(value_name = "DEPLOYMENT_ID")]
    deployment_id: String,
    /// Lock payload as an inline JSON object.
    #[arg(long, value_name = "JSON")]
    payload: Option<String>,
}

/// Arguments for `lock check`.
#[derive(Args, Debug)]
struct LockCheckCommand {
    /// Deployment identifier.
    #[arg(value_name = "DEPLOYMENT_ID")]
    deployment_id: String,
}

/// Arguments for `bootstrap`.
#[derive(Args, Debug)]
struct BootstrapCommand {
    /// Deployment identifier (defaults to `deploy-<unix seconds>`).
    #[arg(long = "deployment-id", value_name = "ID")]
    deployment_id: Option<String>,
    /// Cluster name recorded in the lock.
    #[arg(long, value_name = "CLUSTER")]
    cluster: Option<String>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&format!("model-store {version}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }
    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Check => command_check(&cli.store),
        Commands::Config {
            command,
        } => command_config(&cli.store, command),
        Commands::Lock {
            command,
        } => command_lock(&cli.store, command),
        Commands::Catalog => command_catalog(&cli.store),
        Commands::Bootstrap(command) => command_bootstrap(&cli.store, &command),
    }
}

/// Prints top-level help.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))
}

// ============================================================================
// SECTION: Context
// ============================================================================

/// Loads configuration and applies command-line overrides.
fn load_config(args: &StoreArgs) -> CliResult<ModelStoreConfig> {
    let mut config = ModelStoreConfig::load(args.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    if let Some(bucket) = &args.bucket {
        config.store.bucket.clone_from(bucket);
    }
    if let Some(region) = &args.region {
        config.store.region.clone_from(region);
    }
    if let Some(endpoint) = &args.endpoint {
        config.store.endpoint = Some(endpoint.clone());
    }
    config
        .store
        .validate()
        .map_err(|err| CliError::new(format!("invalid store override: {err}")))?;
    Ok(config)
}

/// Builds the catalog for a loaded config.
fn load_catalog(config: &ModelStoreConfig) -> CliResult<ModelTypeCatalog> {
    config.catalog().map_err(|err| CliError::new(format!("failed to build catalog: {err}")))
}

/// Loads configuration and connects a store.
fn open_store(args: &StoreArgs) -> CliResult<ConfigStore> {
    let config = load_config(args)?;
    let catalog = load_catalog(&config)?;
    let sink: Arc<dyn DiagnosticSink> = build_sink(&config.diagnostics)
        .map_err(|err| CliError::new(format!("failed to open diagnostics: {err}")))?;
    Ok(ConfigStore::connect_s3(&config.store, catalog, config.document.clone(), sink))
}

/// Fails unless the store is ready.
fn require_ready(store: &ConfigStore) -> CliResult<()> {
    match store.readiness() {
        Readiness::Ready => Ok(()),
        Readiness::Unavailable(reason) => {
            Err(CliError::new(format!("bucket {} unavailable: {reason}", store.bucket())))
        }
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes `check`.
fn command_check(args: &StoreArgs) -> CliResult<ExitCode> {
    let store = open_store(args)?;
    require_ready(&store)?;
    stdout(&format!("bucket {} ready", store.bucket()))?;
    Ok(ExitCode::SUCCESS)
}

/// Dispatches config subcommands.
fn command_config(args: &StoreArgs, command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Put(command) => command_config_put(args, &command),
        ConfigCommand::Get(command) => command_config_get(args, &command),
        ConfigCommand::List(command) => command_config_list(args, &command),
        ConfigCommand::Validate => {
            let config = load_config(args)?;
            let source = config
                .source
                .as_ref()
                .map_or_else(|| "built-in defaults".to_string(), |path| path.display().to_string());
            stdout(&format!("config ok ({source})"))?;
            Ok(ExitCode::SUCCESS)
        }
        ConfigCommand::Example => {
            write_stdout_bytes(config_toml_example().as_bytes())
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Executes `config put`.
fn command_config_put(args: &StoreArgs, command: &ConfigPutCommand) -> CliResult<ExitCode> {
    let extra = match (&command.extra, &command.extra_file) {
        (Some(inline), _) => Some(parse_json_object("--extra", inline.as_bytes())?),
        (None, Some(path)) => Some(read_json_object_file(path)?),
        (None, None) => None,
    };
    let store = open_store(args)?;
    require_ready(&store)?;
    let key = store
        .put_config(&command.model_type, extra.as_ref())
        .map_err(|err| CliError::new(format!("upload failed: {err}")))?;
    stdout(&format!("uploaded {} config to s3://{}/{key}", command.model_type, store.bucket()))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `config get`.
fn command_config_get(args: &StoreArgs, command: &ConfigGetCommand) -> CliResult<ExitCode> {
    let store = open_store(args)?;
    require_ready(&store)?;
    match store.get_config(&command.model_type) {
        Ok(ConfigLookup::Found(document)) => {
            let text = serde_json::to_string_pretty(document.as_map())
                .map_err(|err| CliError::new(format!("failed to render document: {err}")))?;
            stdout(&text)?;
            Ok(ExitCode::SUCCESS)
        }
        Ok(ConfigLookup::NotFound) => {
            stderr(&format!("no {} config stored", command.model_type))?;
            Ok(ExitCode::FAILURE)
        }
        Err(err) => Err(CliError::new(format!("download failed: {err}"))),
    }
}

/// Executes `config list`.
fn command_config_list(args: &StoreArgs, command: &ConfigListCommand) -> CliResult<ExitCode> {
    let store = open_store(args)?;
    require_ready(&store)?;
    for key in store.list_configs(&command.prefix) {
        stdout(&key)?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Dispatches lock subcommands.
fn command_lock(args: &StoreArgs, command: LockCommand) -> CliResult<ExitCode> {
    match command {
        LockCommand::Put(command) => {
            let payload = lock_payload(&command)?;
            let store = open_store(args)?;
            require_ready(&store)?;
            let key = store
                .put_lock(&command.deployment_id, payload)
                .map_err(|err| CliError::new(format!("lock write failed: {err}")))?;
            stdout(&format!("created lock s3://{}/{key}", store.bucket()))?;
            Ok(ExitCode::SUCCESS)
        }
        LockCommand::Acquire(command) => {
            let payload = lock_payload(&command)?;
            let store = open_store(args)?;
            require_ready(&store)?;
            match store.acquire_lock(&command.deployment_id, payload) {
                Ok(LockAcquisition::Acquired(key)) => {
                    stdout(&format!("acquired lock s3://{}/{key}", store.bucket()))?;
                    Ok(ExitCode::SUCCESS)
                }
                Ok(LockAcquisition::AlreadyHeld) => {
                    stderr(&format!("lock for {} already held", command.deployment_id))?;
                    Ok(ExitCode::FAILURE)
                }
                Err(err) => Err(CliError::new(format!("lock write failed: {err}"))),
            }
        }
        LockCommand::Check(command) => {
            let store = open_store(args)?;
            require_ready(&store)?;
            let state = if store.lock_exists(&command.deployment_id) { "present" } else { "absent" };
            stdout(&format!("lock for {}: {state}", command.deployment_id))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Executes `catalog`.
fn command_catalog(args: &StoreArgs) -> CliResult<ExitCode> {
    let config = load_config(args)?;
    let catalog = load_catalog(&config)?;
    let text = serde_json::to_string_pretty(&catalog)
        .map_err(|err| CliError::new(format!("failed to render catalog: {err}")))?;
    stdout(&text)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `bootstrap`.
fn command_bootstrap(args: &StoreArgs, command: &BootstrapCommand) -> CliResult<ExitCode> {
    let store = open_store(args)?;
    let mut plan = BootstrapPlan::standard();
    if let Some(deployment_id) = &command.deployment_id {
        plan.deployment_id.clone_from(deployment_id);
    }
    if let Some(cluster) = &command.cluster {
        plan.cluster.clone_from(cluster);
    }
    let report = run_bootstrap(&store, &plan).map_err(|err| {
        store.record(DiagnosticLevel::Critical, "bootstrap", format!("bootstrap aborted: {err}"));
        CliError::new(format!("bootstrap aborted: {err}"))
    })?;
    for line in bootstrap_summary(&report) {
        stdout(&line)?;
    }
    Ok(if report.succeeded() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Renders the bootstrap report as summary lines.
fn bootstrap_summary(report: &BootstrapReport) -> Vec<String> {
    let status = |ok: bool| if ok { "ok" } else { "FAILED" };
    let mut lines = Vec::new();
    for upload in &report.uploads {
        lines.push(format!("{} config: {}", upload.model_type, status(upload.result.is_ok())));
    }
    lines.push(format!("lock {}: {}", report.deployment_id, status(report.lock.is_ok())));
    lines.push(format!("listed configs: {}", report.listed.len()));
    lines.push(format!("verified: {}", status(report.verified)));
    lines.push(if report.succeeded() {
        "all operations completed".to_string()
    } else {
        "some operations failed; see diagnostics".to_string()
    });
    lines
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Parses the optional lock payload.
fn lock_payload(command: &LockWriteCommand) -> CliResult<Map<String, Value>> {
    command
        .payload
        .as_deref()
        .map_or_else(|| Ok(Map::new()), |text| parse_json_object("--payload", text.as_bytes()))
}

/// Parses bytes as a JSON object.
fn parse_json_object(label: &str, bytes: &[u8]) -> CliResult<Map<String, Value>> {
    if bytes.len() > MAX_JSON_INPUT_BYTES {
        return Err(CliError::new(format!(
            "{label} exceeds size limit ({} > {MAX_JSON_INPUT_BYTES})",
            bytes.len()
        )));
    }
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(CliError::new(format!("{label} must be a JSON object"))),
        Err(err) => Err(CliError::new(format!("{label} is not valid JSON: {err}"))),
    }
}

/// Reads a JSON object file with a size limit.
fn read_json_object_file(path: &Path) -> CliResult<Map<String, Value>> {
    let label = path.display().to_string();
    let bytes = read_bytes_with_limit(path, MAX_JSON_INPUT_BYTES).map_err(|err| match err {
        ReadLimitError::Io(err) => CliError::new(format!("failed to read {label}: {err}")),
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(format!("{label} exceeds size limit ({size} > {limit})")),
    })?;
    parse_json_object(&label, &bytes)
}

/// Errors raised while reading size-limited input files.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let size = file.metadata().map_err(ReadLimitError::Io)?.len();
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX);
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    let mut limited = file.take(limit.saturating_add(1));
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a line to stdout, mapping failures to [`CliError`].
fn stdout(message: &str) -> CliResult<()> {
    write_stdout_line(message).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a line to stderr, mapping failures to [`CliError`].
fn stderr(message: &str) -> CliResult<()> {
    write_stderr_line(message).map_err(|err| CliError::new(output_error("stderr", &err)))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
