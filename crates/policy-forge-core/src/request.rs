// crates/policy-forge-core/src/request.rs
// ============================================================================
// Module: Request Parser
// Description: Extraction and validation of the inbound description.
// Purpose: Reject malformed or empty requests before any model call.
// Dependencies: serde_json, thiserror, tracing
// ============================================================================

//! ## Overview
//! The parser accepts the raw request body and yields a [`PolicyRequest`]
//! with a trimmed, non-empty description. Inputs are untrusted: bodies that
//! are not JSON fail with [`ClientError::MalformedInput`], and a missing,
//! non-string, or blank `description` fails with
//! [`ClientError::MissingDescription`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

use crate::model::PolicyRequest;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Number of description characters included in log lines.
pub const LOG_DESCRIPTION_CHARS: usize = 100;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Caller-side request failures.
///
/// # Invariants
/// - Variants are stable for response mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Body is not well-formed JSON.
    #[error("invalid json in request body")]
    MalformedInput,
    /// `description` is absent, not a string, or blank.
    #[error("description is required")]
    MissingDescription,
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Parses the raw request body into a [`PolicyRequest`].
///
/// # Errors
///
/// Returns [`ClientError`] when the body is malformed or has no usable description.
pub fn parse_request(body: &[u8], correlation_id: &str) -> Result<PolicyRequest, ClientError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| ClientError::MalformedInput)?;
    let description = value.get("description").and_then(Value::as_str).map_or("", str::trim);
    if description.is_empty() {
        return Err(ClientError::MissingDescription);
    }
    tracing::info!(
        correlation_id,
        description = truncate_chars(description, LOG_DESCRIPTION_CHARS),
        "generating policy"
    );
    Ok(PolicyRequest {
        description: description.to_string(),
    })
}

/// Returns at most `max_chars` leading characters of `value`.
#[must_use]
pub fn truncate_chars(value: &str, max_chars: usize) -> &str {
    value.char_indices().nth(max_chars).map_or(value, |(idx, _)| &value[..idx])
}

// ============================================================================
// SECTION: Tests
// ============================================================================
