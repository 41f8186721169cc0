// crates/policy-forge-core/src/inference.rs
// ============================================================================
// Module: Inference Service Interface
// Description: Seam between the pipeline and the hosted model endpoint.
// Purpose: Treat the inference service as an opaque prompt-to-text function.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! [`InferenceClient`] is the only boundary the core crosses. Implementations
//! are synchronous: the call is the single blocking operation per request,
//! and transports decide how to host it. Failures are reported as
//! [`UpstreamError`] and are never retried by the core.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum output tokens requested from the model.
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Inputs for a single inference call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InferenceRequest {
    /// Model identifier.
    pub model: String,
    /// System instruction string.
    pub system: String,
    /// Maximum output tokens.
    pub max_tokens: u32,
    /// Single user message.
    pub user_message: String,
}

/// Inference service failures.
///
/// # Invariants
/// - Messages are safe to surface to callers for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamError {
    /// The call exceeded the configured timeout.
    #[error("inference request timed out")]
    Timeout,
    /// The call could not be completed.
    #[error("inference request failed: {0}")]
    Transport(String),
    /// The service answered with a non-success status.
    #[error("inference service returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Bounded excerpt of the response body.
        body: String,
    },
    /// The reply carried no text in its first content item.
    #[error("inference reply missing text content")]
    MissingText,
    /// The reply could not be decoded.
    #[error("invalid inference reply: {0}")]
    InvalidReply(String),
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Hosted model endpoint: prompt in, text out.
pub trait InferenceClient: Send + Sync {
    /// Runs one completion and returns the raw text of the reply.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] when the call fails, times out, or the reply
    /// lacks the expected text field.
    fn complete(&self, request: &InferenceRequest) -> Result<String, UpstreamError>;
}
