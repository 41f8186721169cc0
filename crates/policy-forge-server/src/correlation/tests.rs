// crates/policy-forge-server/src/correlation/tests.rs
// ============================================================================
// Module: Request Correlation Tests
// Description: Unit tests for header sanitization and id issuance.
// Purpose: Validate rejection reasons and identifier formatting.
// Dependencies: policy-forge-server
// ============================================================================

//! ## Overview
//! Validates that malformed client headers are dropped with a stable reason
//! and that server identifiers are unique and well formed.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

use std::collections::HashSet;

use super::CorrelationIdGenerator;
use super::CorrelationIdRejection;
use super::MAX_CLIENT_CORRELATION_ID_LENGTH;
use super::RequestCorrelation;
use super::sanitize_client_correlation_id;

// ============================================================================
// SECTION: Sanitization
// ============================================================================

#[test]
fn sanitize_accepts_token_and_trims() {
    let value = sanitize_client_correlation_id(b"  req-42.abc_DEF~  ").unwrap();
    assert_eq!(value, "req-42.abc_DEF~");
}

#[test]
fn sanitize_rejects_blank() {
    assert_eq!(sanitize_client_correlation_id(b"   "), Err(CorrelationIdRejection::Empty));
}

#[test]
fn sanitize_rejects_too_long() {
    let value = "a".repeat(MAX_CLIENT_CORRELATION_ID_LENGTH + 1);
    assert_eq!(
        sanitize_client_correlation_id(value.as_bytes()),
        Err(CorrelationIdRejection::TooLong)
    );
    let value = "a".repeat(MAX_CLIENT_CORRELATION_ID_LENGTH);
    assert!(sanitize_client_correlation_id(value.as_bytes()).is_ok());
}

#[test]
fn sanitize_rejects_non_ascii() {
    assert_eq!(
        sanitize_client_correlation_id("caf\u{e9}".as_bytes()),
        Err(CorrelationIdRejection::NonAscii)
    );
    assert_eq!(sanitize_client_correlation_id(&[0xff, 0x41]), Err(CorrelationIdRejection::NonAscii));
}

#[test]
fn sanitize_rejects_separators() {
    for raw in ["bad value", "a,b", "semi;colon", "quote\"d", "tab\there"] {
        assert_eq!(
            sanitize_client_correlation_id(raw.as_bytes()),
            Err(CorrelationIdRejection::DisallowedChar),
            "{raw}"
        );
    }
}

#[test]
fn rejection_labels_are_stable() {
    assert_eq!(CorrelationIdRejection::Empty.to_string(), "empty_after_trim");
    assert_eq!(CorrelationIdRejection::DisallowedChar.to_string(), "disallowed_char");
}

// ============================================================================
// SECTION: Issuance
// ============================================================================

#[test]
fn issued_ids_have_stable_format() {
    let generator = CorrelationIdGenerator::with_boot_id(0xabc);
    assert_eq!(generator.issue(), "pf-0000000000000abc-0000000000000001");
    assert_eq!(generator.issue(), "pf-0000000000000abc-0000000000000002");
}

#[test]
fn issued_ids_are_unique() {
    let generator = CorrelationIdGenerator::new();
    let ids: HashSet<String> = (0..256).map(|_| generator.issue()).collect();
    assert_eq!(ids.len(), 256);
}

#[test]
fn request_correlation_drops_invalid_client_id() {
    let generator = CorrelationIdGenerator::with_boot_id(1);
    let accepted = RequestCorrelation::issue(&generator, Some(b"client-1"));
    assert_eq!(accepted.client_id.as_deref(), Some("client-1"));

    let dropped = RequestCorrelation::issue(&generator, Some(b"not valid"));
    assert_eq!(dropped.client_id, None);
    assert_ne!(accepted.server_id, dropped.server_id);

    let absent = RequestCorrelation::issue(&generator, None);
    assert_eq!(absent.client_id, None);
}
