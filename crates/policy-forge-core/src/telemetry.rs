// crates/policy-forge-core/src/telemetry.rs
// ============================================================================
// Module: Generation Telemetry
// Description: Observability hooks for policy generation requests.
// Purpose: Provide outcome counters and latency events without hard deps.
// Dependencies: serde, tracing
// ============================================================================

//! ## Overview
//! This module exposes a thin metrics interface for request outcomes and
//! latencies. Deployments can plug in Prometheus or OpenTelemetry behind
//! [`GenerationMetrics`]; the default sinks either discard events or emit them
//! as `tracing` events. Metrics never affect control flow.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default latency buckets in milliseconds for request histograms.
pub const LATENCY_BUCKETS_MS: &[u64] =
    &[10, 25, 50, 100, 250, 500, 1_000, 2_500, 5_000, 10_000, 30_000, 60_000];

/// Returns the upper bound of the smallest bucket holding `latency`.
///
/// Returns `None` when the latency exceeds the largest bucket.
#[must_use]
pub fn latency_bucket_ms(latency: Duration) -> Option<u64> {
    let millis = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
    LATENCY_BUCKETS_MS.iter().copied().find(|bound| millis <= *bound)
}

// ============================================================================
// SECTION: Metric Labels
// ============================================================================

/// Request outcome classification.
///
/// # Invariants
/// - Variants are stable for telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum GenerationOutcome {
    /// Validated policy returned.
    Ok,
    /// Request rejected before any model call.
    ClientError,
    /// Inference service failure.
    UpstreamError,
    /// No JSON object found in the reply.
    ExtractionFailed,
    /// Extracted JSON failed validation.
    ValidationFailed,
}

impl GenerationOutcome {
    /// Returns a stable label for the outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::ClientError => "client_error",
            Self::UpstreamError => "upstream_error",
            Self::ExtractionFailed => "extraction_failed",
            Self::ValidationFailed => "validation_failed",
        }
    }
}

/// Request metric event payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationEvent {
    /// Server-issued correlation identifier.
    pub correlation_id: String,
    /// Request outcome.
    pub outcome: GenerationOutcome,
    /// Response status code.
    pub status: u16,
    /// Statement count for successful requests.
    pub statement_count: Option<usize>,
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Metrics sink for generation requests.
pub trait GenerationMetrics: Send + Sync {
    /// Records a request counter event.
    fn record_request(&self, event: &GenerationEvent);
    /// Records a latency observation for the request.
    fn record_latency(&self, event: &GenerationEvent, latency: Duration);
}

/// No-op metrics sink.
pub struct NoopMetrics;

impl GenerationMetrics for NoopMetrics {
    fn record_request(&self, _event: &GenerationEvent) {}

    fn record_latency(&self, _event: &GenerationEvent, _latency: Duration) {}
}

/// Metrics sink that emits events through `tracing`.
pub struct TracingMetrics;

impl GenerationMetrics for TracingMetrics {
    fn record_request(&self, event: &GenerationEvent) {
        tracing::debug!(
            correlation_id = %event.correlation_id,
            outcome = event.outcome.as_str(),
            status = event.status,
            statement_count = event.statement_count,
            "policy request completed"
        );
    }

    fn record_latency(&self, event: &GenerationEvent, latency: Duration) {
        tracing::debug!(
            correlation_id = %event.correlation_id,
            outcome = event.outcome.as_str(),
            latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
            latency_bucket_ms = latency_bucket_ms(latency),
            "policy request latency"
        );
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
