// crates/policy-forge-core/src/handler.rs
// ============================================================================
// Module: Request Handler
// Description: Linear orchestration of parse, generate, extract, validate.
// Purpose: Produce exactly one response envelope per request.
// Dependencies: crate::{extract, generator, request, response, validate}
// ============================================================================

//! ## Overview
//! [`PolicyHandler`] runs the pipeline for one request body:
//! parse (400 on failure), generate (500 on upstream failure), extract (500
//! when no JSON or only an empty object is found), validate (500 when the shape is wrong), success
//! (200). The fallible pipeline is wrapped by a single result-mapping
//! boundary so every failure becomes an envelope; nothing is retried and no
//! partial policy is ever returned. The handler holds no mutable state and is
//! shared across concurrent requests.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use crate::extract::extract_json;
use crate::generator::GenerationSettings;
use crate::generator::generate;
use crate::inference::InferenceClient;
use crate::inference::UpstreamError;
use crate::request::ClientError;
use crate::request::parse_request;
use crate::response::ResponseEnvelope;
use crate::telemetry::GenerationEvent;
use crate::telemetry::GenerationMetrics;
use crate::telemetry::GenerationOutcome;
use crate::telemetry::NoopMetrics;
use crate::validate::ValidationFailure;
use crate::validate::statement_count;
use crate::validate::validate_detailed;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Pipeline failures, one per non-success terminal state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandlerError {
    /// Request parsing failed.
    #[error(transparent)]
    Client(#[from] ClientError),
    /// Inference call failed.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    /// No JSON object found in the reply.
    #[error("failed to extract json from inference reply")]
    ExtractionFailed,
    /// Extracted JSON failed validation.
    #[error("generated policy failed validation: {0}")]
    ValidationFailed(ValidationFailure),
}

impl HandlerError {
    /// Returns the telemetry outcome for the failure.
    #[must_use]
    pub const fn outcome(&self) -> GenerationOutcome {
        match self {
            Self::Client(_) => GenerationOutcome::ClientError,
            Self::Upstream(_) => GenerationOutcome::UpstreamError,
            Self::ExtractionFailed => GenerationOutcome::ExtractionFailed,
            Self::ValidationFailed(_) => GenerationOutcome::ValidationFailed,
        }
    }

    /// Maps the failure onto its response envelope.
    #[must_use]
    pub fn to_envelope(&self) -> ResponseEnvelope {
        match self {
            Self::Client(err) => ResponseEnvelope::client_error(*err),
            Self::Upstream(err) => ResponseEnvelope::internal_error(err.to_string()),
            Self::ExtractionFailed => ResponseEnvelope::extraction_failed(),
            Self::ValidationFailed(_) => ResponseEnvelope::validation_failed(),
        }
    }
}

/// Validated pipeline output.
struct GeneratedPolicy {
    /// Policy value exactly as extracted.
    policy: Value,
    /// Number of statements in the policy.
    statement_count: usize,
}

// ============================================================================
// SECTION: Handler
// ============================================================================

/// Request handler for policy generation.
pub struct PolicyHandler {
    /// Inference service client.
    client: Arc<dyn InferenceClient>,
    /// Startup-fixed generation settings.
    settings: GenerationSettings,
    /// Metrics sink.
    metrics: Arc<dyn GenerationMetrics>,
}

impl PolicyHandler {
    /// Creates a handler with a no-op metrics sink.
    #[must_use]
    pub fn new(client: Arc<dyn InferenceClient>, settings: GenerationSettings) -> Self {
        Self {
            client,
            settings,
            metrics: Arc::new(NoopMetrics),
        }
    }

    /// Replaces the metrics sink.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn GenerationMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Returns the generation settings.
    #[must_use]
    pub const fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Handles one raw request body and returns its terminal envelope.
    #[must_use]
    pub fn handle(&self, body: &[u8], correlation_id: &str) -> ResponseEnvelope {
        let started = Instant::now();
        let (envelope, outcome, statements) = match self.try_handle(body, correlation_id) {
            Ok(generated) => (
                ResponseEnvelope::success(generated.policy, generated.statement_count),
                GenerationOutcome::Ok,
                Some(generated.statement_count),
            ),
            Err(err) => {
                log_failure(&err, correlation_id);
                (err.to_envelope(), err.outcome(), None)
            }
        };
        let event = GenerationEvent {
            correlation_id: correlation_id.to_string(),
            outcome,
            status: envelope.status(),
            statement_count: statements,
        };
        self.metrics.record_request(&event);
        self.metrics.record_latency(&event, started.elapsed());
        envelope
    }

    /// Runs the fallible pipeline.
    fn try_handle(&self, body: &[u8], correlation_id: &str) -> Result<GeneratedPolicy, HandlerError> {
        let request = parse_request(body, correlation_id)?;
        let generation = generate(self.client.as_ref(), &self.settings, &request.description)?;
        let policy = extract_json(&generation.text)
            .filter(|value| !is_empty_object(value))
            .ok_or(HandlerError::ExtractionFailed)?;
        validate_detailed(&policy).map_err(HandlerError::ValidationFailed)?;
        let statement_count = statement_count(&policy);
        tracing::info!(
            correlation_id,
            statement_count,
            "policy generated successfully in {:.2}s",
            generation.elapsed.as_secs_f64()
        );
        Ok(GeneratedPolicy {
            policy,
            statement_count,
        })
    }
}

/// Returns true for `{}`, which counts as nothing extracted.
fn is_empty_object(value: &Value) -> bool {
    value.as_object().is_some_and(serde_json::Map::is_empty)
}

/// Logs a pipeline failure before its envelope is built.
fn log_failure(err: &HandlerError, correlation_id: &str) {
    match err {
        HandlerError::Client(cause) => {
            tracing::warn!(correlation_id, cause = %cause, "rejected policy request");
        }
        HandlerError::Upstream(cause) => {
            tracing::error!(correlation_id, cause = %cause, "inference call failed");
        }
        HandlerError::ExtractionFailed => {
            tracing::error!(correlation_id, "failed to extract json from inference reply");
        }
        HandlerError::ValidationFailed(cause) => {
            tracing::error!(correlation_id, cause = %cause, "generated policy failed validation");
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
