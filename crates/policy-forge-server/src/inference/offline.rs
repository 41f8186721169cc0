// crates/policy-forge-server/src/inference/offline.rs
// ============================================================================
// Module: Offline Keyword Client
// Description: Deterministic local policy generator.
// Purpose: Serve development and demo traffic without a hosted model.
// Dependencies: policy-forge-core, serde_json
// ============================================================================

//! ## Overview
//! [`KeywordClient`] looks for a service keyword paired with an access verb
//! in the description (for example `s3` with `read`) and emits one canned
//! statement per matching rule. When nothing matches it falls back to a
//! read-only S3 statement. The policy is returned inside a short prose reply
//! so the extraction step runs exactly as it does for a hosted model.

// ============================================================================
// SECTION: Imports
// ============================================================================

use policy_forge_core::Effect;
use policy_forge_core::InferenceClient;
use policy_forge_core::InferenceRequest;
use policy_forge_core::OneOrMany;
use policy_forge_core::Policy;
use policy_forge_core::Statement;
use policy_forge_core::UpstreamError;
use policy_forge_core::prompt::USER_INSTRUCTION_PREFIX;
use serde_json::Map;

// ============================================================================
// SECTION: Rules
// ============================================================================

/// One keyword rule: a service word and a verb that must both appear.
struct KeywordRule {
    /// Service keyword.
    service: &'static str,
    /// Access verb keyword.
    verb: &'static str,
    /// Statement identifier.
    sid: &'static str,
    /// Granted actions.
    actions: &'static [&'static str],
    /// Resource ARN pattern.
    resource: &'static str,
}

/// Rules in emission order.
const RULES: &[KeywordRule] = &[
    KeywordRule {
        service: "s3",
        verb: "read",
        sid: "S3ReadAccess",
        actions: &["s3:GetObject", "s3:ListBucket"],
        resource: "arn:aws:s3:::your-bucket-name/*",
    },
    KeywordRule {
        service: "s3",
        verb: "write",
        sid: "S3WriteAccess",
        actions: &["s3:PutObject", "s3:DeleteObject"],
        resource: "arn:aws:s3:::your-bucket-name/*",
    },
    KeywordRule {
        service: "dynamodb",
        verb: "read",
        sid: "DynamoDbReadAccess",
        actions: &["dynamodb:GetItem", "dynamodb:Query", "dynamodb:Scan"],
        resource: "arn:aws:dynamodb:*:*:table/your-table-name",
    },
    KeywordRule {
        service: "dynamodb",
        verb: "write",
        sid: "DynamoDbWriteAccess",
        actions: &["dynamodb:PutItem", "dynamodb:UpdateItem", "dynamodb:DeleteItem"],
        resource: "arn:aws:dynamodb:*:*:table/your-table-name",
    },
    KeywordRule {
        service: "lambda",
        verb: "invoke",
        sid: "LambdaInvoke",
        actions: &["lambda:InvokeFunction"],
        resource: "arn:aws:lambda:*:*:function:your-function-name",
    },
    KeywordRule {
        service: "ec2",
        verb: "read",
        sid: "Ec2Describe",
        actions: &["ec2:DescribeInstances", "ec2:DescribeVolumes"],
        resource: "*",
    },
    KeywordRule {
        service: "cloudwatch",
        verb: "log",
        sid: "CloudWatchLogsWrite",
        actions: &["logs:CreateLogGroup", "logs:CreateLogStream", "logs:PutLogEvents"],
        resource: "arn:aws:logs:*:*:*",
    },
];

/// Rule used when no keyword pair matches.
const FALLBACK_RULE: KeywordRule = KeywordRule {
    service: "s3",
    verb: "read",
    sid: "S3ReadAccess",
    actions: &["s3:GetObject", "s3:ListBucket"],
    resource: "arn:aws:s3:::example-bucket/*",
};

impl KeywordRule {
    /// Returns true when both keywords appear in the lowercased description.
    fn matches(&self, description: &str) -> bool {
        description.contains(self.service) && description.contains(self.verb)
    }

    /// Builds the statement granted by this rule.
    fn statement(&self) -> Statement {
        Statement {
            sid: Some(self.sid.to_string()),
            effect: Effect::Allow,
            action: OneOrMany::Many(self.actions.iter().map(|action| (*action).to_string()).collect()),
            resource: OneOrMany::One(self.resource.to_string()),
            condition: None,
            extra: Map::new(),
        }
    }
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Offline inference client backed by keyword rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClient;

impl KeywordClient {
    /// Creates the client.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Builds the policy for a free-text description.
    #[must_use]
    pub fn policy_for(description: &str) -> Policy {
        let lowered = description.to_lowercase();
        let mut statements: Vec<Statement> = RULES
            .iter()
            .filter(|rule| rule.matches(&lowered))
            .map(KeywordRule::statement)
            .collect();
        if statements.is_empty() {
            statements.push(FALLBACK_RULE.statement());
        }
        Policy::new(statements)
    }
}

impl InferenceClient for KeywordClient {
    fn complete(&self, request: &InferenceRequest) -> Result<String, UpstreamError> {
        let description = request
            .user_message
            .strip_prefix(USER_INSTRUCTION_PREFIX)
            .unwrap_or(&request.user_message);
        let policy = Self::policy_for(description);
        let rendered = serde_json::to_string_pretty(&policy)
            .map_err(|err| UpstreamError::InvalidReply(format!("policy serialization failed: {err}")))?;
        Ok(format!(
            "Here is a least-privilege IAM policy for the requested access:\n\n{rendered}\n\nReplace \
             the placeholder resource names before use."
        ))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions.")]

    use policy_forge_core::extract_json;
    use policy_forge_core::validate;

    use super::KeywordClient;

    /// Collects statement ids for a description.
    fn sids(description: &str) -> Vec<String> {
        KeywordClient::policy_for(description)
            .statements
            .into_iter()
            .filter_map(|statement| statement.sid)
            .collect()
    }

    #[test]
    fn keyword_pairs_select_rules_in_order() {
        assert_eq!(
            sids("Read from S3 and DynamoDB, then ship CloudWatch logs"),
            ["S3ReadAccess", "DynamoDbReadAccess", "CloudWatchLogsWrite"]
        );
        assert_eq!(sids("invoke a lambda"), ["LambdaInvoke"]);
        assert_eq!(sids("read ec2 inventory"), ["Ec2Describe"]);
    }

    #[test]
    fn unmatched_description_falls_back_to_example_bucket() {
        let policy = KeywordClient::policy_for("something vague");
        assert_eq!(policy.statements.len(), 1);
        assert_eq!(policy.statements[0].resource.as_slice(), ["arn:aws:s3:::example-bucket/*"]);
    }

    #[test]
    fn service_without_verb_does_not_match() {
        assert_eq!(sids("s3 bucket"), ["S3ReadAccess"]);
        let policy = KeywordClient::policy_for("s3 bucket");
        assert_eq!(policy.statements[0].resource.as_slice(), ["arn:aws:s3:::example-bucket/*"]);
    }

    #[test]
    fn rendered_policy_survives_prose_wrapping() {
        let policy = serde_json::to_value(KeywordClient::policy_for("read s3")).unwrap();
        let text = format!("Here you go:\n{policy}\nDone.");
        let extracted = extract_json(&text).unwrap();
        assert!(validate(&extracted));
    }
}
