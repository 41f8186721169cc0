// crates/policy-forge-config/tests/common/mod.rs
// ============================================================================
// Module: Common Config Test Fixtures
// Description: Temp-file helpers for config loading tests.
// Purpose: Provide reusable config files and environment lookups.
// Dependencies: tempfile
// ============================================================================

//! ## Overview
//! Shared helpers for writing config files and faking the environment.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test fixtures favor direct unwraps for setup clarity."
)]

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

/// Writes `content` to `policy-forge.toml` in a fresh temp dir.
pub fn write_config(content: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("policy-forge.toml");
    fs::write(&path, content).unwrap();
    (dir, path)
}

/// Returns an environment lookup backed by fixed pairs.
pub fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
    let map: HashMap<String, String> =
        pairs.iter().map(|(key, value)| ((*key).to_string(), (*value).to_string())).collect();
    move |key| map.get(key).cloned()
}

/// Environment lookup with no variables set.
pub fn empty_env(_key: &str) -> Option<String> {
    None
}

/// Complete config exercising every section.
pub const FULL_CONFIG: &str = r#"
[server]
bind = "0.0.0.0:9090"
max_body_bytes = 4096

[inference]
backend = "messages"
endpoint = "https://inference.internal.example/v1/messages"
model_id = "claude-3-5-sonnet-20241022"
timeout_ms = 15000
api_key_env = "POLICY_FORGE_TEST_KEY"
api_version = "2023-06-01"
max_response_bytes = 262144

[logging]
level = "warn"
format = "json"
"#;
