// crates/policy-forge-server/tests/common/mod.rs
// ============================================================================
// Module: Common Server Test Fixtures
// Description: Fake inference endpoint and in-process server helpers.
// Purpose: Provide reusable network fixtures for server integration tests.
// Dependencies: policy-forge-server, tiny_http, tokio
// ============================================================================

//! ## Overview
//! A single-shot `tiny_http` endpoint stands in for the hosted inference API
//! and records what it received. A helper runs the full axum server on a
//! background runtime bound to an ephemeral loopback port.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::unwrap_in_result,
    reason = "Test fixtures favor direct unwraps for setup clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use policy_forge_config::InferenceBackend;
use policy_forge_config::InferenceConfig;
use policy_forge_config::PolicyForgeConfig;
use policy_forge_core::PolicyHandler;
use policy_forge_server::PolicyServer;
use serde_json::json;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Fake Inference Endpoint
// ============================================================================

/// Request captured by the fake endpoint.
#[derive(Debug, Default)]
pub struct CapturedRequest {
    /// Header name/value pairs, names lowercased.
    pub headers: Vec<(String, String)>,
    /// Raw request body.
    pub body: String,
}

impl CapturedRequest {
    /// Returns the first header value with `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }
}

/// Starts a one-request endpoint replying with `status` and `body` after `delay`.
pub fn fake_inference_delayed(
    status: u16,
    body: String,
    delay: Duration,
) -> (String, thread::JoinHandle<CapturedRequest>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let handle = thread::spawn(move || {
        let Ok(mut request) = server.recv() else {
            return CapturedRequest::default();
        };
        let headers = request
            .headers()
            .iter()
            .map(|header| {
                (header.field.as_str().as_str().to_ascii_lowercase(), header.value.as_str().to_string())
            })
            .collect();
        let mut captured_body = String::new();
        let _ = request.as_reader().read_to_string(&mut captured_body);
        thread::sleep(delay);
        let content_type = Header::from_bytes("Content-Type", "application/json").unwrap();
        let response = Response::from_string(body).with_status_code(status).with_header(content_type);
        let _ = request.respond(response);
        CapturedRequest {
            headers,
            body: captured_body,
        }
    });
    (format!("http://{addr}/v1/messages"), handle)
}

/// Starts a one-request endpoint replying immediately.
pub fn fake_inference(status: u16, body: String) -> (String, thread::JoinHandle<CapturedRequest>) {
    fake_inference_delayed(status, body, Duration::ZERO)
}

/// Builds a messages API reply carrying `text`.
pub fn messages_reply(text: &str) -> String {
    json!({
        "id": "msg_test",
        "type": "message",
        "role": "assistant",
        "content": [{"type": "text", "text": text}],
        "stop_reason": "end_turn"
    })
    .to_string()
}

/// Inference settings pointing at a local endpoint.
pub fn inference_config(endpoint: &str) -> InferenceConfig {
    InferenceConfig {
        backend: InferenceBackend::Messages,
        endpoint: endpoint.to_string(),
        timeout_ms: 5_000,
        api_key_env: "POLICY_FORGE_TEST_UNSET_KEY".to_string(),
        ..InferenceConfig::default()
    }
}

/// Returns a loopback URL with no listener behind it.
pub fn unused_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/v1/messages")
}

// ============================================================================
// SECTION: In-Process Server
// ============================================================================

/// Running server handle.
pub struct RunningServer {
    /// Base URL, e.g. `http://127.0.0.1:PORT`.
    pub base_url: String,
    /// Handler kept alive outside the server runtime.
    pub handler: Arc<PolicyHandler>,
}

/// Starts the full HTTP server on an ephemeral port.
pub fn spawn_server(mut config: PolicyForgeConfig) -> RunningServer {
    config.server.bind = "127.0.0.1:0".to_string();
    let server = PolicyServer::from_config(config).unwrap();
    let handler = server.handler();
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    listener.set_nonblocking(true).unwrap();
    thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            let _ = server.serve_on(listener).await;
        });
    });
    RunningServer {
        base_url: format!("http://{addr}"),
        handler,
    }
}

/// Config using the offline backend.
pub fn offline_config() -> PolicyForgeConfig {
    let mut config = PolicyForgeConfig::default();
    config.inference.backend = InferenceBackend::Offline;
    config
}

/// Blocking HTTP client for talking to the server.
pub fn http_client() -> reqwest::blocking::Client {
    reqwest::blocking::Client::builder().timeout(Duration::from_secs(10)).build().unwrap()
}
