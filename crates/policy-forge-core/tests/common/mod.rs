// crates/policy-forge-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Shared inference doubles and sample replies for core tests.
// Purpose: Provide deterministic clients that count and capture calls.
// Dependencies: policy-forge-core
// ============================================================================

//! ## Overview
//! Fixtures shared by the core integration tests. The scripted client
//! replays a fixed result and counts how often it was invoked so tests can
//! assert that rejected requests never reach the model.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test fixtures favor direct unwraps for setup clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use policy_forge_core::GenerationSettings;
use policy_forge_core::InferenceClient;
use policy_forge_core::InferenceRequest;
use policy_forge_core::PolicyHandler;
use policy_forge_core::UpstreamError;

// ============================================================================
// SECTION: Sample Replies
// ============================================================================

/// Valid single-statement policy.
pub const VALID_POLICY: &str = r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Action":["s3:GetObject"],"Resource":["arn:aws:s3:::reports/*"]}]}"#;

/// Valid policy wrapped in conversational prose.
pub fn prose_wrapped(policy: &str) -> String {
    format!("Here is the policy you asked for:\n\n{policy}\n\nLet me know if you need changes.")
}

// ============================================================================
// SECTION: Inference Doubles
// ============================================================================

/// Client that replays a fixed result and records every request.
pub struct ScriptedClient {
    /// Result returned for every call.
    reply: Result<String, UpstreamError>,
    /// Number of calls observed.
    calls: AtomicUsize,
    /// Requests observed, in order.
    requests: Mutex<Vec<InferenceRequest>>,
}

impl ScriptedClient {
    /// Creates a client that always returns `text`.
    pub fn replying(text: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.into()),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Creates a client that always fails with `error`.
    pub fn failing(error: UpstreamError) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(error),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Returns the number of calls observed.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Returns the last request observed.
    pub fn last_request(&self) -> Option<InferenceRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl InferenceClient for ScriptedClient {
    fn complete(&self, request: &InferenceRequest) -> Result<String, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.reply.clone()
    }
}

/// Builds a handler with default settings around `client`.
pub fn handler_for(client: Arc<ScriptedClient>) -> PolicyHandler {
    PolicyHandler::new(client, GenerationSettings::default())
}
