// crates/policy-forge-core/src/validate.rs
// ============================================================================
// Module: Policy Validator
// Description: Structural validation of extracted policy documents.
// Purpose: Reject model output that is not a well-formed IAM policy shape.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! Validation is structural only and short-circuits on the first failing
//! rule, checked in this order:
//! 1. the value is an object;
//! 2. `Version` is exactly [`POLICY_VERSION`];
//! 3. `Statement` is a non-empty list;
//! 4. every statement is an object with `Effect` of `Allow`/`Deny` and with
//!    `Action` and `Resource` present (any type).
//!
//! ARN syntax, action names, and condition keys are not inspected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

use crate::model::POLICY_VERSION;

// ============================================================================
// SECTION: Failures
// ============================================================================

/// First validation rule a policy value failed.
///
/// # Invariants
/// - `index` fields are zero-based positions within `Statement`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationFailure {
    /// Top-level value is not an object.
    #[error("policy is not a json object")]
    NotAnObject,
    /// `Version` is missing or not the supported version string.
    #[error("policy version must be 2012-10-17")]
    VersionMismatch,
    /// `Statement` is missing or not a list.
    #[error("policy statement must be a list")]
    StatementNotList,
    /// `Statement` is an empty list.
    #[error("policy statement list is empty")]
    StatementEmpty,
    /// A statement is not an object.
    #[error("statement {index} is not a json object")]
    StatementNotObject {
        /// Statement position.
        index: usize,
    },
    /// A statement has no valid `Effect`.
    #[error("statement {index} effect must be Allow or Deny")]
    InvalidEffect {
        /// Statement position.
        index: usize,
    },
    /// A statement has no `Action`.
    #[error("statement {index} is missing Action")]
    MissingAction {
        /// Statement position.
        index: usize,
    },
    /// A statement has no `Resource`.
    #[error("statement {index} is missing Resource")]
    MissingResource {
        /// Statement position.
        index: usize,
    },
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Returns true when `value` is a structurally valid policy.
#[must_use]
pub fn validate(value: &Value) -> bool {
    validate_detailed(value).is_ok()
}

/// Validates `value` and reports the first failing rule.
///
/// # Errors
///
/// Returns [`ValidationFailure`] describing the first rule that failed.
pub fn validate_detailed(value: &Value) -> Result<(), ValidationFailure> {
    let Value::Object(policy) = value else {
        return Err(ValidationFailure::NotAnObject);
    };
    if policy.get("Version").and_then(Value::as_str) != Some(POLICY_VERSION) {
        return Err(ValidationFailure::VersionMismatch);
    }
    let Some(Value::Array(statements)) = policy.get("Statement") else {
        return Err(ValidationFailure::StatementNotList);
    };
    if statements.is_empty() {
        return Err(ValidationFailure::StatementEmpty);
    }
    for (index, statement) in statements.iter().enumerate() {
        validate_statement(index, statement)?;
    }
    Ok(())
}

/// Validates a single statement entry.
fn validate_statement(index: usize, statement: &Value) -> Result<(), ValidationFailure> {
    let Value::Object(fields) = statement else {
        return Err(ValidationFailure::StatementNotObject {
            index,
        });
    };
    match fields.get("Effect").and_then(Value::as_str) {
        Some("Allow" | "Deny") => {}
        _ => {
            return Err(ValidationFailure::InvalidEffect {
                index,
            });
        }
    }
    if !fields.contains_key("Action") {
        return Err(ValidationFailure::MissingAction {
            index,
        });
    }
    if !fields.contains_key("Resource") {
        return Err(ValidationFailure::MissingResource {
            index,
        });
    }
    Ok(())
}

/// Returns the number of entries in a validated policy's `Statement` list.
#[must_use]
pub fn statement_count(value: &Value) -> usize {
    value.get("Statement").and_then(Value::as_array).map_or(0, Vec::len)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
