// crates/policy-forge-server/src/correlation.rs
// ============================================================================
// Module: Request Correlation
// Description: Client header sanitization and server correlation issuance.
// Purpose: Tag every request and log line with a bounded identifier.
// Dependencies: rand, thiserror
// ============================================================================

//! ## Overview
//! Every HTTP response carries a server-issued correlation identifier of the
//! form `pf-<boot>-<seq>`, where `boot` is drawn from the OS RNG once per
//! process and `seq` is a monotonic counter. Callers may also send their own
//! identifier in [`CLIENT_CORRELATION_HEADER`]; it is untrusted, restricted
//! to HTTP token characters, and dropped (never echoed) when invalid.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use rand::RngCore;
use rand::rngs::OsRng;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Header carrying a caller-supplied correlation identifier.
pub const CLIENT_CORRELATION_HEADER: &str = "x-correlation-id";
/// Header carrying the server-issued correlation identifier.
pub const SERVER_CORRELATION_HEADER: &str = "x-server-correlation-id";
/// Maximum accepted length of a client correlation identifier.
pub const MAX_CLIENT_CORRELATION_ID_LENGTH: usize = 128;
/// Prefix of server-issued identifiers.
pub const SERVER_CORRELATION_PREFIX: &str = "pf";

// ============================================================================
// SECTION: Rejections
// ============================================================================

/// Reason a client correlation identifier was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CorrelationIdRejection {
    /// Header was present but blank.
    #[error("empty_after_trim")]
    Empty,
    /// Header exceeded [`MAX_CLIENT_CORRELATION_ID_LENGTH`].
    #[error("too_long")]
    TooLong,
    /// Header was not valid visible ASCII.
    #[error("non_ascii")]
    NonAscii,
    /// Header contained a character outside the HTTP token set.
    #[error("disallowed_char")]
    DisallowedChar,
}

// ============================================================================
// SECTION: Generator
// ============================================================================

/// Issues process-unique server correlation identifiers.
#[derive(Debug)]
pub struct CorrelationIdGenerator {
    /// Random per-process component.
    boot_id: u64,
    /// Next sequence number.
    next: AtomicU64,
}

impl CorrelationIdGenerator {
    /// Creates a generator seeded from the OS RNG.
    #[must_use]
    pub fn new() -> Self {
        Self::with_boot_id(OsRng.next_u64())
    }

    /// Creates a generator with a fixed boot component.
    #[must_use]
    pub const fn with_boot_id(boot_id: u64) -> Self {
        Self {
            boot_id,
            next: AtomicU64::new(1),
        }
    }

    /// Issues the next identifier.
    #[must_use]
    pub fn issue(&self) -> String {
        let seq = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{SERVER_CORRELATION_PREFIX}-{:016x}-{seq:016x}", self.boot_id)
    }
}

impl Default for CorrelationIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SECTION: Request Correlation
// ============================================================================

/// Correlation identifiers attached to one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestCorrelation {
    /// Server-issued identifier; tags logs and responses.
    pub server_id: String,
    /// Sanitized caller identifier, if one was supplied and valid.
    pub client_id: Option<String>,
}

impl RequestCorrelation {
    /// Issues a server identifier and sanitizes the optional client header.
    ///
    /// An invalid client header is dropped and logged; it never fails the
    /// request.
    #[must_use]
    pub fn issue(generator: &CorrelationIdGenerator, client_header: Option<&[u8]>) -> Self {
        let server_id = generator.issue();
        let client_id = client_header.and_then(|raw| match sanitize_client_correlation_id(raw) {
            Ok(value) => Some(value),
            Err(rejection) => {
                tracing::warn!(
                    correlation_id = %server_id,
                    reason = %rejection,
                    "ignoring invalid client correlation id"
                );
                None
            }
        });
        Self {
            server_id,
            client_id,
        }
    }
}

/// Validates a raw client correlation header value.
///
/// # Errors
///
/// Returns [`CorrelationIdRejection`] when the value is blank, too long, or
/// contains anything but HTTP token characters.
pub fn sanitize_client_correlation_id(raw: &[u8]) -> Result<String, CorrelationIdRejection> {
    let text = std::str::from_utf8(raw).map_err(|_| CorrelationIdRejection::NonAscii)?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CorrelationIdRejection::Empty);
    }
    if trimmed.len() > MAX_CLIENT_CORRELATION_ID_LENGTH {
        return Err(CorrelationIdRejection::TooLong);
    }
    if !trimmed.is_ascii() {
        return Err(CorrelationIdRejection::NonAscii);
    }
    if !trimmed.bytes().all(is_token_byte) {
        return Err(CorrelationIdRejection::DisallowedChar);
    }
    Ok(trimmed.to_string())
}

/// Returns true for RFC 9110 `tchar` bytes.
const fn is_token_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
        || matches!(
            byte,
            b'!' | b'#'
                | b'$'
                | b'%'
                | b'&'
                | b'\''
                | b'*'
                | b'+'
                | b'-'
                | b'.'
                | b'^'
                | b'_'
                | b'`'
                | b'|'
                | b'~'
        )
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
