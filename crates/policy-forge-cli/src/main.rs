// crates/policy-forge-cli/src/main.rs
// ============================================================================
// Module: Policy Forge CLI Entry Point
// Description: Command dispatcher for serving and one-shot policy generation.
// Purpose: Run the HTTP server, generate a single policy, or check config.
// Dependencies: clap, policy-forge-config, policy-forge-core, policy-forge-server, tokio
// ============================================================================

//! ## Overview
//! `policy-forge serve` runs the HTTP server. `policy-forge generate` pushes
//! one description through the same request handler and prints the response
//! envelope. `policy-forge config validate` loads and checks a config file.
//! All output goes through explicit writers; the process exit code reflects
//! the outcome.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use policy_forge_config::InferenceBackend;
use policy_forge_config::LogFormat;
use policy_forge_config::PolicyForgeConfig;
use policy_forge_core::ResponseEnvelope;
use policy_forge_server::CorrelationIdGenerator;
use policy_forge_server::PolicyServer;
use policy_forge_server::init_tracing;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "policy-forge", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP policy server.
    Serve(ServeCommand),
    /// Generate one policy and print the response.
    Generate(GenerateCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Shared config path argument.
#[derive(Args, Debug, Default)]
struct ConfigArgs {
    /// Path to a policy-forge.toml file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for `serve`.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Config location.
    #[command(flatten)]
    config: ConfigArgs,
}

/// Arguments for `generate`.
#[derive(Args, Debug)]
struct GenerateCommand {
    /// Config location.
    #[command(flatten)]
    config: ConfigArgs,
    /// Use the offline keyword backend regardless of config.
    #[arg(long)]
    offline: bool,
    /// Access description; multiple words are joined with spaces.
    #[arg(value_name = "DESCRIPTION", required = true, num_args = 1..)]
    description: Vec<String>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate configuration, then print a summary.
    Validate(ConfigArgs),
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a user-facing message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
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
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Commands::Serve(command) => command_serve(&command),
        Commands::Generate(command) => command_generate(&command),
        Commands::Config {
            command: ConfigCommand::Validate(args),
        } => command_config_validate(&args),
    }
}

// ============================================================================
// SECTION: Serve Command
// ============================================================================

/// Executes the `serve` command.
///
/// The server and its blocking inference client are built before the async
/// runtime starts, and a handler reference is held until the runtime is gone
/// so the client is never dropped on a runtime worker.
fn command_serve(command: &ServeCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.config.as_deref())?;
    install_tracing(&config);
    let server = PolicyServer::from_config(config)
        .map_err(|err| CliError::new(format!("server init failed: {err}")))?;
    let handler = server.handler();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| CliError::new(format!("runtime init failed: {err}")))?;
    let outcome = runtime.block_on(server.serve());
    drop(runtime);
    drop(handler);
    outcome.map_err(|err| CliError::new(format!("server failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Generate Command
// ============================================================================

/// Executes the `generate` command.
fn command_generate(command: &GenerateCommand) -> CliResult<ExitCode> {
    let mut config = load_config(command.config.config.as_deref())?;
    if command.offline {
        config.inference.backend = InferenceBackend::Offline;
    }
    install_tracing(&config);
    let server = PolicyServer::from_config(config)
        .map_err(|err| CliError::new(format!("generator init failed: {err}")))?;
    let body = request_body(&command.description)?;
    let correlation_id = CorrelationIdGenerator::new().issue();
    let envelope = server.handler().handle(&body, &correlation_id);
    write_envelope(&envelope)?;
    if envelope.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Builds the JSON request body for a description given as words.
fn request_body(words: &[String]) -> CliResult<Vec<u8>> {
    serde_json::to_vec(&json!({"description": words.join(" ")}))
        .map_err(|err| CliError::new(format!("request encoding failed: {err}")))
}

/// Renders an envelope as `{status, body}`.
fn render_envelope(envelope: &ResponseEnvelope) -> Value {
    json!({
        "status": envelope.status(),
        "body": envelope.body(),
    })
}

/// Writes an envelope to stdout as pretty JSON.
fn write_envelope(envelope: &ResponseEnvelope) -> CliResult<()> {
    let rendered = serde_json::to_string_pretty(&render_envelope(envelope))
        .map_err(|err| CliError::new(format!("response encoding failed: {err}")))?;
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))
}

// ============================================================================
// SECTION: Config Command
// ============================================================================

/// Executes `config validate`.
fn command_config_validate(args: &ConfigArgs) -> CliResult<ExitCode> {
    let config = load_config(args.config.as_deref())?;
    for line in config_summary(&config) {
        write_stdout_line(&line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Summarizes the effective configuration, one setting per line.
fn config_summary(config: &PolicyForgeConfig) -> Vec<String> {
    let source = config
        .source
        .as_ref()
        .map_or_else(|| "built-in defaults".to_string(), |path| path.display().to_string());
    let format = match config.logging.format {
        LogFormat::Text => "text",
        LogFormat::Json => "json",
    };
    let mut lines = vec![
        "config ok".to_string(),
        format!("source: {source}"),
        format!("bind: {}", config.server.bind),
        format!("max_body_bytes: {}", config.server.max_body_bytes),
        format!("backend: {}", config.inference.backend.as_str()),
        format!("model_id: {}", config.inference.model_id),
    ];
    if config.inference.backend == InferenceBackend::Messages {
        lines.push(format!("endpoint: {}", config.inference.endpoint));
        lines.push(format!("timeout_ms: {}", config.inference.timeout_ms));
        lines.push(format!("api_key_env: {}", config.inference.api_key_env));
    }
    lines.push(format!("log: {} ({format})", config.logging.level.as_str()));
    lines
}

// ============================================================================
// SECTION: Shared Helpers
// ============================================================================

/// Loads and validates configuration.
fn load_config(path: Option<&Path>) -> CliResult<PolicyForgeConfig> {
    PolicyForgeConfig::load(path).map_err(|err| CliError::new(format!("config load failed: {err}")))
}

/// Installs tracing and records where configuration came from.
fn install_tracing(config: &PolicyForgeConfig) {
    if !init_tracing(&config.logging) {
        let _ = write_stderr_line("tracing subscriber already installed");
    }
    let source = config.source.as_ref().map(|path| path.display().to_string());
    tracing::debug!(
        config_source = source.as_deref().unwrap_or("defaults"),
        backend = config.inference.backend.as_str(),
        "configuration loaded"
    );
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
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
