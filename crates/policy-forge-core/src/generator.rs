// crates/policy-forge-core/src/generator.rs
// ============================================================================
// Module: Policy Generator
// Description: Prompt assembly and a single inference call per request.
// Purpose: Turn a validated description into raw model reply text.
// Dependencies: crate::{inference, prompt}
// ============================================================================

//! ## Overview
//! The generator wraps the description in a [`PromptEnvelope`], invokes the
//! [`InferenceClient`] exactly once, and hands back the raw reply text along
//! with the measured call duration. The duration is observational only.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;
use std::time::Instant;

use crate::inference::DEFAULT_MAX_TOKENS;
use crate::inference::InferenceClient;
use crate::inference::InferenceRequest;
use crate::inference::UpstreamError;
use crate::prompt::PromptEnvelope;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Model identifier used when configuration does not override it.
pub const DEFAULT_MODEL_ID: &str = "claude-3-5-sonnet-20241022";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Process-wide generation settings, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSettings {
    /// Model identifier passed to the inference service.
    pub model_id: String,
    /// Maximum output tokens.
    pub max_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Raw model output for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    /// Reply text as returned by the service.
    pub text: String,
    /// Wall-clock duration of the inference call.
    pub elapsed: Duration,
}

// ============================================================================
// SECTION: Generation
// ============================================================================

/// Builds the prompt for `description` and runs one inference call.
///
/// # Errors
///
/// Returns [`UpstreamError`] when the inference call fails. No retry is attempted.
pub fn generate(
    client: &dyn InferenceClient,
    settings: &GenerationSettings,
    description: &str,
) -> Result<Generation, UpstreamError> {
    let prompt = PromptEnvelope::for_description(description);
    let request = InferenceRequest {
        model: settings.model_id.clone(),
        system: prompt.system().to_string(),
        max_tokens: settings.max_tokens,
        user_message: prompt.user_message().to_string(),
    };
    let started = Instant::now();
    let text = client.complete(&request)?;
    Ok(Generation {
        text,
        elapsed: started.elapsed(),
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
