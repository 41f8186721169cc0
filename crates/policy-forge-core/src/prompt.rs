// crates/policy-forge-core/src/prompt.rs
// ============================================================================
// Module: Prompt Construction
// Description: Fixed system instructions and per-request user instruction.
// Purpose: Build deterministic prompts for policy generation.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Every request uses the same system instructions: an enumerated rule set
//! followed by one worked example. Only the user instruction varies, and it
//! is derived from the caller's description alone, so identical descriptions
//! always yield identical prompts.

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Fixed system instructions sent with every generation request.
pub const SYSTEM_PROMPT: &str = r#"You are an AWS IAM policy expert. Generate least-privilege IAM policies in JSON format.

Rules:
1. Use specific actions; do not use broad wildcards such as s3:* unless the request explicitly asks for them
2. Use full resource ARNs whenever resource names are provided
3. Add condition keys for additional security context where relevant (VPC endpoints, tags, encryption)
4. Output ONLY the JSON policy document (AWS IAM policy format, Version 2012-10-17)
5. Use "Effect": "Allow" only; do not emit Deny statements
6. Give every statement a descriptive Sid
7. Group statements logically by AWS service and action type

Example Input: "Lambda function needs to read from S3 bucket 'data-lake'"
Example Output:
{
  "Version": "2012-10-17",
  "Statement": [
    {
      "Sid": "ReadFromDataLakeBucket",
      "Effect": "Allow",
      "Action": [
        "s3:GetObject",
        "s3:ListBucket"
      ],
      "Resource": [
        "arn:aws:s3:::data-lake",
        "arn:aws:s3:::data-lake/*"
      ]
    }
  ]
}"#;

/// Prefix of the per-request user instruction.
pub const USER_INSTRUCTION_PREFIX: &str = "Generate an IAM policy for: ";

// ============================================================================
// SECTION: Prompt Envelope
// ============================================================================

/// Prompt for a single inference call.
///
/// # Invariants
/// - `system` is always [`SYSTEM_PROMPT`].
/// - Never persisted; lives only for one inference call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptEnvelope {
    /// Per-request user instruction.
    user: String,
}

impl PromptEnvelope {
    /// Builds the prompt for a trimmed description.
    #[must_use]
    pub fn for_description(description: &str) -> Self {
        Self {
            user: format!("{USER_INSTRUCTION_PREFIX}{description}"),
        }
    }

    /// Returns the fixed system instructions.
    #[must_use]
    pub const fn system(&self) -> &'static str {
        SYSTEM_PROMPT
    }

    /// Returns the per-request user instruction.
    #[must_use]
    pub fn user_message(&self) -> &str {
        &self.user
    }
}
