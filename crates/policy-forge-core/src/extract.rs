// crates/policy-forge-core/src/extract.rs
// ============================================================================
// Module: Response Extractor
// Description: Best-effort location of a JSON object inside free text.
// Purpose: Tolerate preamble and trailing commentary in model replies.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Model replies are not guaranteed to be pure JSON. The extractor takes the
//! span from the first `{` to the last `}` (inclusive) and parses it. When the
//! reply contains several top-level objects the span over-captures the text
//! between them and parsing fails; that outcome is reported as "no value".

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

// ============================================================================
// SECTION: Extraction
// ============================================================================

/// Returns the JSON value spanning the first `{` to the last `}` in `text`.
///
/// Returns `None` when either brace is missing, when the opening brace does
/// not precede the closing one, or when the span does not parse.
#[must_use]
pub fn extract_json(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if start >= end {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
