// crates/policy-forge-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument parsing and output rendering.
// Purpose: Keep the command surface and printed shapes stable.
// Dependencies: policy-forge-cli main helpers
// ============================================================================

//! ## Overview
//! Parses representative command lines and checks the request body, envelope
//! rendering, and config summary helpers.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use clap::Parser;
use policy_forge_config::InferenceBackend;
use policy_forge_config::PolicyForgeConfig;
use policy_forge_core::ClientError;
use policy_forge_core::ResponseEnvelope;
use serde_json::Value;
use serde_json::json;

use super::Cli;
use super::Commands;
use super::ConfigCommand;
use super::config_summary;
use super::render_envelope;
use super::request_body;

// ============================================================================
// SECTION: Parsing
// ============================================================================

#[test]
fn generate_collects_description_words() {
    let cli = Cli::try_parse_from([
        "policy-forge",
        "generate",
        "--offline",
        "--config",
        "forge.toml",
        "read",
        "from",
        "s3",
    ])
    .unwrap();
    let Commands::Generate(command) = cli.command else {
        panic!("expected generate command");
    };
    assert!(command.offline);
    assert_eq!(command.config.config, Some(PathBuf::from("forge.toml")));
    assert_eq!(command.description, ["read", "from", "s3"]);
}

#[test]
fn generate_requires_description() {
    assert!(Cli::try_parse_from(["policy-forge", "generate"]).is_err());
}

#[test]
fn serve_and_config_validate_parse() {
    let cli = Cli::try_parse_from(["policy-forge", "serve"]).unwrap();
    assert!(matches!(cli.command, Commands::Serve(ref command) if command.config.config.is_none()));

    let cli = Cli::try_parse_from(["policy-forge", "config", "validate", "--config", "a.toml"])
        .unwrap();
    let Commands::Config {
        command: ConfigCommand::Validate(args),
    } = cli.command
    else {
        panic!("expected config validate");
    };
    assert_eq!(args.config, Some(PathBuf::from("a.toml")));
}

#[test]
fn unknown_subcommand_is_rejected() {
    assert!(Cli::try_parse_from(["policy-forge", "deploy"]).is_err());
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

#[test]
fn request_body_joins_words() {
    let body = request_body(&["read".to_string(), "orders".to_string()]).unwrap();
    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value, json!({"description": "read orders"}));
}

#[test]
fn envelope_renders_status_and_body() {
    let rendered = render_envelope(&ResponseEnvelope::client_error(ClientError::MalformedInput));
    assert_eq!(rendered, json!({"status": 400, "body": {"error": "Invalid JSON in request body"}}));
}

#[test]
fn summary_lists_endpoint_only_for_messages_backend() {
    let mut config = PolicyForgeConfig::default();
    let lines = config_summary(&config);
    assert_eq!(lines[0], "config ok");
    assert!(lines.contains(&"source: built-in defaults".to_string()));
    assert!(lines.iter().any(|line| line.starts_with("endpoint: ")));

    config.inference.backend = InferenceBackend::Offline;
    config.source = Some(PathBuf::from("/etc/policy-forge.toml"));
    let lines = config_summary(&config);
    assert!(lines.contains(&"backend: offline".to_string()));
    assert!(lines.contains(&"source: /etc/policy-forge.toml".to_string()));
    assert!(!lines.iter().any(|line| line.starts_with("endpoint: ")));
}
