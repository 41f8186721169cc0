// crates/policy-forge-core/src/lib.rs
// ============================================================================
// Module: Policy Forge Core Library
// Description: Public API surface for the Policy Forge request pipeline.
// Purpose: Expose parsing, generation, extraction, and validation stages.
// Dependencies: serde, serde_json, thiserror, tracing
// ============================================================================

//! ## Overview
//! Policy Forge turns a natural-language access description into a
//! least-privilege IAM policy by delegating to a hosted inference service.
//! The core is transport-agnostic: it parses the inbound body, builds a
//! deterministic prompt, calls an [`InferenceClient`], extracts the JSON
//! object from the free-text reply, validates its shape, and maps every
//! outcome onto a [`ResponseEnvelope`]. All state is request-scoped.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod extract;
pub mod generator;
pub mod handler;
pub mod inference;
pub mod model;
pub mod prompt;
pub mod request;
pub mod response;
pub mod telemetry;
pub mod validate;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use extract::extract_json;
pub use generator::DEFAULT_MODEL_ID;
pub use generator::Generation;
pub use generator::GenerationSettings;
pub use generator::generate;
pub use handler::HandlerError;
pub use handler::PolicyHandler;
pub use inference::DEFAULT_MAX_TOKENS;
pub use inference::InferenceClient;
pub use inference::InferenceRequest;
pub use inference::UpstreamError;
pub use model::Effect;
pub use model::OneOrMany;
pub use model::POLICY_VERSION;
pub use model::Policy;
pub use model::PolicyRequest;
pub use model::Statement;
pub use prompt::PromptEnvelope;
pub use request::ClientError;
pub use request::parse_request;
pub use response::ResponseEnvelope;
pub use telemetry::GenerationEvent;
pub use telemetry::GenerationMetrics;
pub use telemetry::GenerationOutcome;
pub use telemetry::LATENCY_BUCKETS_MS;
pub use telemetry::NoopMetrics;
pub use telemetry::TracingMetrics;
pub use telemetry::latency_bucket_ms;
pub use validate::ValidationFailure;
pub use validate::validate;
pub use validate::validate_detailed;
