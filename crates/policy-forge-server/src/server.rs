// crates/policy-forge-server/src/server.rs
// ============================================================================
// Module: Policy HTTP Server
// Description: axum transport for the policy generation handler.
// Purpose: Map HTTP requests onto handler envelopes and back.
// Dependencies: axum, policy-forge-core, policy-forge-config, tokio
// ============================================================================

//! ## Overview
//! The server exposes the request handler on `POST /policies` and
//! `POST /generate`, answers CORS preflight on the same paths, and reports
//! liveness on `GET /health`. Anything else is a JSON 404.
//!
//! Request bodies are capped at `server.max_body_bytes` before the handler
//! runs. The handler itself is synchronous; on the multi-thread runtime it is
//! shifted onto a blocking-capable thread, and a panic inside it is mapped to
//! the generic server-error envelope. Every response carries the
//! server-issued correlation id.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::panic;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::HeaderMap;
use axum::http::HeaderName;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::http::header;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use policy_forge_config::PolicyForgeConfig;
use policy_forge_core::ClientError;
use policy_forge_core::PolicyHandler;
use policy_forge_core::ResponseEnvelope;
use policy_forge_core::TracingMetrics;
use serde_json::Value;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::runtime::Handle;
use tokio::runtime::RuntimeFlavor;

use crate::correlation::CLIENT_CORRELATION_HEADER;
use crate::correlation::CorrelationIdGenerator;
use crate::correlation::RequestCorrelation;
use crate::correlation::SERVER_CORRELATION_HEADER;
use crate::inference::build_inference_client;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Primary generation route.
pub const ROUTE_POLICIES: &str = "/policies";
/// Alias generation route.
pub const ROUTE_GENERATE: &str = "/generate";
/// Liveness route.
pub const ROUTE_HEALTH: &str = "/health";

/// Error label for unknown routes.
const ERROR_NOT_FOUND: &str = "Not found";
/// Error label for oversized request bodies.
const ERROR_BODY_TOO_LARGE: &str = "Request body too large";
/// Message used when the handler panics.
const MESSAGE_HANDLER_PANIC: &str = "unexpected failure while generating policy";
/// Methods advertised by CORS preflight.
const CORS_ALLOW_METHODS: &str = "POST, OPTIONS";
/// Headers advertised by CORS preflight.
const CORS_ALLOW_HEADERS: &str = "Content-Type, x-correlation-id";

// ============================================================================
// SECTION: Server
// ============================================================================

/// HTTP server for policy generation.
pub struct PolicyServer {
    /// Validated configuration.
    config: PolicyForgeConfig,
    /// Shared request handler.
    handler: Arc<PolicyHandler>,
}

impl PolicyServer {
    /// Builds the server and its inference backend from configuration.
    ///
    /// The messages backend builds a blocking HTTP client, so call this
    /// outside of async contexts (or via `spawn_blocking`).
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when configuration is invalid or the backend
    /// cannot be initialized.
    pub fn from_config(config: PolicyForgeConfig) -> Result<Self, ServerError> {
        config.validate().map_err(|err| ServerError::Config(err.to_string()))?;
        let client = build_inference_client(&config.inference, |key| std::env::var(key).ok())?;
        let handler = PolicyHandler::new(client, config.generation_settings())
            .with_metrics(Arc::new(TracingMetrics));
        Ok(Self::with_handler(config, Arc::new(handler)))
    }

    /// Builds a server around an existing handler.
    #[must_use]
    pub const fn with_handler(config: PolicyForgeConfig, handler: Arc<PolicyHandler>) -> Self {
        Self {
            config,
            handler,
        }
    }

    /// Returns a shared reference to the request handler.
    #[must_use]
    pub fn handler(&self) -> Arc<PolicyHandler> {
        Arc::clone(&self.handler)
    }

    /// Returns the server configuration.
    #[must_use]
    pub const fn config(&self) -> &PolicyForgeConfig {
        &self.config
    }

    /// Builds the axum router.
    #[must_use]
    pub fn router(&self) -> Router {
        build_router(Arc::new(ServerState::new(
            Arc::clone(&self.handler),
            self.config.server.max_body_bytes,
        )))
    }

    /// Binds the configured address and serves until the listener fails.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), ServerError> {
        let addr =
            self.config.server.bind_addr().map_err(|err| ServerError::Config(err.to_string()))?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|err| ServerError::Transport(format!("http bind failed: {err}")))?;
        self.serve_on(listener).await
    }

    /// Serves on an already-bound listener.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Transport`] when the server fails.
    pub async fn serve_on(self, listener: TcpListener) -> Result<(), ServerError> {
        if let Ok(addr) = listener.local_addr() {
            tracing::info!(
                %addr,
                backend = self.config.inference.backend.as_str(),
                model_id = %self.config.inference.model_id,
                "policy server listening"
            );
        }
        let app = self.router();
        axum::serve(listener, app)
            .await
            .map_err(|err| ServerError::Transport(format!("http server failed: {err}")))
    }
}

// ============================================================================
// SECTION: Router
// ============================================================================

/// Shared state for HTTP handlers.
struct ServerState {
    /// Request handler.
    handler: Arc<PolicyHandler>,
    /// Server correlation id issuer.
    correlation: CorrelationIdGenerator,
    /// Maximum accepted request body size.
    max_body_bytes: usize,
}

impl ServerState {
    /// Creates state with a fresh correlation generator.
    fn new(handler: Arc<PolicyHandler>, max_body_bytes: usize) -> Self {
        Self {
            handler,
            correlation: CorrelationIdGenerator::new(),
            max_body_bytes,
        }
    }
}

/// Builds the route table.
fn build_router(state: Arc<ServerState>) -> Router {
    let max_body_bytes = state.max_body_bytes;
    Router::new()
        .route(
            ROUTE_POLICIES,
            post(handle_generate).options(handle_preflight).fallback(handle_not_found),
        )
        .route(
            ROUTE_GENERATE,
            post(handle_generate).options(handle_preflight).fallback(handle_not_found),
        )
        .route(ROUTE_HEALTH, get(handle_health).fallback(handle_not_found))
        .fallback(handle_not_found)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Handles a policy generation request.
async fn handle_generate(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let correlation = RequestCorrelation::issue(
        &state.correlation,
        headers.get(CLIENT_CORRELATION_HEADER).map(HeaderValue::as_bytes),
    );
    let span = tracing::info_span!(
        "policy_request",
        correlation_id = %correlation.server_id,
        client_correlation_id = correlation.client_id.as_deref(),
    );
    span.in_scope(|| {
        let correlation_id = correlation.server_id.as_str();
        let envelope = match body {
            Ok(bytes) if bytes.len() > state.max_body_bytes => {
                return body_too_large(correlation_id, bytes.len());
            }
            Ok(bytes) => run_handler(&state.handler, &bytes, correlation_id),
            Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                return body_too_large(correlation_id, state.max_body_bytes.saturating_add(1));
            }
            Err(rejection) => {
                tracing::warn!(correlation_id, cause = %rejection, "failed to read request body");
                ResponseEnvelope::client_error(ClientError::MalformedInput)
            }
        };
        envelope_response(&envelope, correlation_id)
    })
}

/// Answers CORS preflight.
async fn handle_preflight(State(state): State<Arc<ServerState>>) -> Response {
    let correlation_id = state.correlation.issue();
    let mut response = json_response(StatusCode::OK, json!({}), &correlation_id);
    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(CORS_ALLOW_METHODS));
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(CORS_ALLOW_HEADERS));
    response
}

/// Reports liveness.
async fn handle_health(State(state): State<Arc<ServerState>>) -> Response {
    let correlation_id = state.correlation.issue();
    json_response(StatusCode::OK, json!({"status": "ok"}), &correlation_id)
}

/// Answers unknown routes and methods.
async fn handle_not_found(State(state): State<Arc<ServerState>>) -> Response {
    let correlation_id = state.correlation.issue();
    tracing::debug!(correlation_id = %correlation_id, "no route matched");
    json_response(StatusCode::NOT_FOUND, json!({"error": ERROR_NOT_FOUND}), &correlation_id)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Runs the handler, shifting to a blocking context when available.
fn run_handler(handler: &PolicyHandler, body: &[u8], correlation_id: &str) -> ResponseEnvelope {
    let invoke = || {
        panic::catch_unwind(AssertUnwindSafe(|| handler.handle(body, correlation_id)))
            .unwrap_or_else(|_| {
                tracing::error!(correlation_id, "policy handler panicked");
                ResponseEnvelope::internal_error(MESSAGE_HANDLER_PANIC)
            })
    };
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(invoke)
        }
        _ => invoke(),
    }
}

/// Builds the 413 response for an oversized body.
fn body_too_large(correlation_id: &str, observed: usize) -> Response {
    tracing::warn!(correlation_id, observed_bytes = observed, "request body too large");
    json_response(
        StatusCode::PAYLOAD_TOO_LARGE,
        json!({"error": ERROR_BODY_TOO_LARGE}),
        correlation_id,
    )
}

/// Serializes an envelope into an HTTP response.
fn envelope_response(envelope: &ResponseEnvelope, correlation_id: &str) -> Response {
    let status =
        StatusCode::from_u16(envelope.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = json_response(status, envelope.body(), correlation_id);
    if envelope.is_success() {
        response
            .headers_mut()
            .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    }
    response
}

/// Builds a JSON response tagged with the server correlation id.
fn json_response(status: StatusCode, body: Value, correlation_id: &str) -> Response {
    let mut response = (status, Json(body)).into_response();
    if let Ok(value) = HeaderValue::from_str(correlation_id) {
        response.headers_mut().insert(HeaderName::from_static(SERVER_CORRELATION_HEADER), value);
    }
    response
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Policy server errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================
