// crates/policy-forge-core/src/response.rs
// ============================================================================
// Module: Response Envelopes
// Description: Terminal response shapes for every request outcome.
// Purpose: Map pipeline results onto stable status codes and JSON bodies.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Every request ends in exactly one [`ResponseEnvelope`]. Envelopes are
//! built once, never mutated, and serialized immediately by the transport.
//! Error labels are stable strings that clients match on.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use crate::request::ClientError;

// ============================================================================
// SECTION: Error Labels
// ============================================================================

/// Error label for a missing or blank description.
pub const ERROR_DESCRIPTION_REQUIRED: &str = "Description is required";
/// Error label for a body that is not valid JSON.
pub const ERROR_INVALID_JSON: &str = "Invalid JSON in request body";
/// Error label when no JSON object could be extracted from the reply.
pub const ERROR_GENERATION_FAILED: &str = "Policy generation failed";
/// Error label when the extracted policy fails validation.
pub const ERROR_INVALID_POLICY: &str = "Invalid policy generated";
/// Error label for upstream and unexpected failures.
pub const ERROR_INTERNAL: &str = "Internal server error";

/// Message attached to [`ERROR_DESCRIPTION_REQUIRED`].
const MESSAGE_DESCRIPTION_REQUIRED: &str = "Please provide a description of your access needs";
/// Message attached to [`ERROR_GENERATION_FAILED`].
const MESSAGE_GENERATION_FAILED: &str = "Could not generate valid IAM policy";
/// Message attached to [`ERROR_INVALID_POLICY`].
const MESSAGE_INVALID_POLICY: &str = "Generated policy does not meet validation requirements";

// ============================================================================
// SECTION: Envelope
// ============================================================================

/// Terminal response for one request.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseEnvelope {
    /// Validated policy (200).
    Success {
        /// Policy exactly as extracted from the model reply.
        policy: Value,
        /// Human-readable summary.
        explanation: String,
        /// Reserved; always empty.
        warnings: Vec<String>,
    },
    /// Caller error (400).
    ClientError {
        /// Stable error label.
        error: &'static str,
        /// Optional detail message.
        message: Option<String>,
    },
    /// Generation, extraction, validation, or upstream failure (500).
    ServerError {
        /// Stable error label.
        error: &'static str,
        /// Detail message.
        message: String,
    },
}

impl ResponseEnvelope {
    /// Builds a success envelope for a validated policy.
    #[must_use]
    pub fn success(policy: Value, statement_count: usize) -> Self {
        Self::Success {
            policy,
            explanation: format!(
                "Generated least-privilege IAM policy with {statement_count} statement(s)"
            ),
            warnings: Vec::new(),
        }
    }

    /// Builds the 400 envelope for a parser failure.
    #[must_use]
    pub fn client_error(error: ClientError) -> Self {
        match error {
            ClientError::MalformedInput => Self::ClientError {
                error: ERROR_INVALID_JSON,
                message: None,
            },
            ClientError::MissingDescription => Self::ClientError {
                error: ERROR_DESCRIPTION_REQUIRED,
                message: Some(MESSAGE_DESCRIPTION_REQUIRED.to_string()),
            },
        }
    }

    /// Builds the 500 envelope used when no JSON could be extracted.
    #[must_use]
    pub fn extraction_failed() -> Self {
        Self::ServerError {
            error: ERROR_GENERATION_FAILED,
            message: MESSAGE_GENERATION_FAILED.to_string(),
        }
    }

    /// Builds the 500 envelope used when validation fails.
    #[must_use]
    pub fn validation_failed() -> Self {
        Self::ServerError {
            error: ERROR_INVALID_POLICY,
            message: MESSAGE_INVALID_POLICY.to_string(),
        }
    }

    /// Builds the generic 500 envelope, keeping the cause for diagnostics.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::ServerError {
            error: ERROR_INTERNAL,
            message: message.into(),
        }
    }

    /// Returns the HTTP status code for the envelope.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::Success {
                ..
            } => 200,
            Self::ClientError {
                ..
            } => 400,
            Self::ServerError {
                ..
            } => 500,
        }
    }

    /// Returns true for the success envelope.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns the JSON response body.
    #[must_use]
    pub fn body(&self) -> Value {
        match self {
            Self::Success {
                policy,
                explanation,
                warnings,
            } => json!({
                "policy": policy,
                "explanation": explanation,
                "warnings": warnings,
            }),
            Self::ClientError {
                error,
                message,
            } => {
                let mut body = Map::new();
                body.insert("error".to_string(), Value::from(*error));
                if let Some(message) = message {
                    body.insert("message".to_string(), Value::from(message.as_str()));
                }
                Value::Object(body)
            }
            Self::ServerError {
                error,
                message,
            } => json!({
                "error": error,
                "message": message,
            }),
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
