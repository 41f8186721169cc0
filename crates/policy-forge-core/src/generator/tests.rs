// crates/policy-forge-core/src/generator/tests.rs
// ============================================================================
// Module: Policy Generator Tests
// Description: Unit tests for prompt assembly and upstream error surfacing.
// Purpose: Validate the request handed to the inference client.
// Dependencies: policy-forge-core
// ============================================================================

//! ## Overview
//! Uses a capturing client to confirm the model identifier, token budget,
//! and prompt content, and that upstream failures pass through untouched.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

use std::sync::Mutex;

use super::DEFAULT_MODEL_ID;
use super::GenerationSettings;
use super::generate;
use crate::inference::InferenceClient;
use crate::inference::InferenceRequest;
use crate::inference::UpstreamError;
use crate::prompt::SYSTEM_PROMPT;

/// Client that records requests and replays a fixed result.
struct CapturingClient {
    /// Requests seen so far.
    seen: Mutex<Vec<InferenceRequest>>,
    /// Result returned for every call.
    reply: Result<String, UpstreamError>,
}

impl InferenceClient for CapturingClient {
    fn complete(&self, request: &InferenceRequest) -> Result<String, UpstreamError> {
        self.seen.lock().unwrap().push(request.clone());
        self.reply.clone()
    }
}

#[test]
fn generate_sends_fixed_prompt_and_settings() {
    let client = CapturingClient {
        seen: Mutex::new(Vec::new()),
        reply: Ok("reply text".to_string()),
    };
    let settings = GenerationSettings::default();
    let generation = generate(&client, &settings, "read logs").unwrap();
    assert_eq!(generation.text, "reply text");

    let seen = client.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].model, DEFAULT_MODEL_ID);
    assert_eq!(seen[0].max_tokens, 2048);
    assert_eq!(seen[0].system, SYSTEM_PROMPT);
    assert_eq!(seen[0].user_message, "Generate an IAM policy for: read logs");
}

#[test]
fn generate_uses_configured_model() {
    let client = CapturingClient {
        seen: Mutex::new(Vec::new()),
        reply: Ok(String::new()),
    };
    let settings = GenerationSettings {
        model_id: "custom-model".to_string(),
        max_tokens: 512,
    };
    generate(&client, &settings, "x").unwrap();
    let seen = client.seen.lock().unwrap();
    assert_eq!(seen[0].model, "custom-model");
    assert_eq!(seen[0].max_tokens, 512);
}

#[test]
fn generate_surfaces_upstream_errors() {
    let client = CapturingClient {
        seen: Mutex::new(Vec::new()),
        reply: Err(UpstreamError::Timeout),
    };
    let err = generate(&client, &GenerationSettings::default(), "x").expect_err("expected error");
    assert_eq!(err, UpstreamError::Timeout);
    assert_eq!(client.seen.lock().unwrap().len(), 1);
}
