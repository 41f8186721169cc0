// crates/policy-forge-core/src/model/tests.rs
// ============================================================================
// Module: Data Model Tests
// Description: Unit tests for the typed policy model.
// Purpose: Validate wire-format keys and single-or-list handling.
// Dependencies: policy-forge-core
// ============================================================================

//! ## Overview
//! Confirms that typed policies serialize with IAM key names and that unknown
//! keys survive a decode/encode pass.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

use serde_json::json;

use super::Effect;
use super::OneOrMany;
use super::POLICY_VERSION;
use super::Policy;
use super::Statement;

#[test]
fn policy_serializes_with_iam_keys() {
    let policy = Policy::new(vec![Statement {
        sid: Some("ReadBucket".to_string()),
        effect: Effect::Allow,
        action: OneOrMany::One("s3:GetObject".to_string()),
        resource: OneOrMany::Many(vec!["arn:aws:s3:::data".to_string()]),
        condition: None,
        extra: serde_json::Map::new(),
    }]);
    let value = serde_json::to_value(&policy).unwrap();
    assert_eq!(
        value,
        json!({
            "Version": POLICY_VERSION,
            "Statement": [{
                "Sid": "ReadBucket",
                "Effect": "Allow",
                "Action": "s3:GetObject",
                "Resource": ["arn:aws:s3:::data"]
            }]
        })
    );
}

#[test]
fn unknown_keys_survive_round_trip() {
    let raw = json!({
        "Version": "2012-10-17",
        "Id": "policy-1",
        "Statement": [{
            "Effect": "Deny",
            "Action": ["s3:DeleteObject"],
            "Resource": "*",
            "Principal": {"AWS": "*"}
        }]
    });
    let policy = Policy::from_value(raw.clone()).unwrap();
    assert_eq!(policy.statements[0].effect, Effect::Deny);
    assert_eq!(policy.extra.get("Id"), Some(&json!("policy-1")));
    assert_eq!(serde_json::to_value(&policy).unwrap(), raw);
}

#[test]
fn one_or_many_exposes_slice() {
    let one = OneOrMany::One("a".to_string());
    let many = OneOrMany::from(vec!["a".to_string(), "b".to_string()]);
    assert_eq!(one.as_slice().len(), 1);
    assert_eq!(many.as_slice(), ["a".to_string(), "b".to_string()]);
}

#[test]
fn typed_decode_rejects_non_string_actions() {
    let raw = json!({
        "Version": "2012-10-17",
        "Statement": [{"Effect": "Allow", "Action": 42, "Resource": "*"}]
    });
    assert!(Policy::from_value(raw).is_err());
}
