// crates/policy-forge-core/src/model.rs
// ============================================================================
// Module: Policy Forge Data Model
// Description: Request and IAM policy document types.
// Purpose: Provide typed views of the inbound request and generated policies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Types here mirror the IAM policy wire format exactly (PascalCase keys).
//! Unknown keys are captured in `extra` so a policy round-trips through the
//! typed model without losing fields the model chose to emit.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// The only policy language version accepted by the validator.
pub const POLICY_VERSION: &str = "2012-10-17";

// ============================================================================
// SECTION: Request
// ============================================================================

/// Parsed policy generation request.
///
/// # Invariants
/// - `description` is trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRequest {
    /// Natural-language description of the access need.
    pub description: String,
}

// ============================================================================
// SECTION: Policy Document
// ============================================================================

/// Statement effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Grants the listed actions.
    Allow,
    /// Denies the listed actions.
    Deny,
}

impl Effect {
    /// Returns the wire label for the effect.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "Allow",
            Self::Deny => "Deny",
        }
    }
}

/// A value that IAM accepts either as a single item or as a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// Single scalar value.
    One(T),
    /// Ordered list of values.
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Returns the values as a slice regardless of representation.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        match self {
            Self::One(value) => std::slice::from_ref(value),
            Self::Many(values) => values,
        }
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(values: Vec<T>) -> Self {
        Self::Many(values)
    }
}

/// One access-control rule within a policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    /// Optional statement identifier.
    #[serde(rename = "Sid", default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    /// Allow or deny.
    #[serde(rename = "Effect")]
    pub effect: Effect,
    /// Action or actions covered by the statement.
    #[serde(rename = "Action")]
    pub action: OneOrMany<String>,
    /// Resource or resources covered by the statement.
    #[serde(rename = "Resource")]
    pub resource: OneOrMany<String>,
    /// Optional condition block.
    #[serde(rename = "Condition", default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Map<String, Value>>,
    /// Keys not modelled above (e.g. `Principal`, `NotAction`).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// IAM policy document.
///
/// # Invariants
/// - A validated policy has `version == POLICY_VERSION` and at least one statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    /// Policy language version.
    #[serde(rename = "Version")]
    pub version: String,
    /// Ordered statements.
    #[serde(rename = "Statement")]
    pub statements: Vec<Statement>,
    /// Keys not modelled above (e.g. `Id`).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Policy {
    /// Builds a current-version policy from statements.
    #[must_use]
    pub fn new(statements: Vec<Statement>) -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            statements,
            extra: Map::new(),
        }
    }

    /// Decodes a policy from a JSON value.
    ///
    /// The structural validator accepts `Action`/`Resource` of any JSON type,
    /// so a value that passes validation can still fail typed decoding.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] when the value does not fit the typed model.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
