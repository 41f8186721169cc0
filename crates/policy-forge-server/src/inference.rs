// crates/policy-forge-server/src/inference.rs
// ============================================================================
// Module: Inference Backends
// Description: Concrete inference clients selected by configuration.
// Purpose: Build the `InferenceClient` the request handler calls.
// Dependencies: policy-forge-config, policy-forge-core, reqwest
// ============================================================================

//! ## Overview
//! Two backends implement [`InferenceClient`]:
//! - [`MessagesClient`] posts the prompt to a hosted messages API over a
//!   blocking HTTP client with an explicit timeout and response size cap.
//! - [`KeywordClient`] is a deterministic local generator used for
//!   development, demos, and tests; it never touches the network.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use policy_forge_config::InferenceBackend;
use policy_forge_config::InferenceConfig;
use policy_forge_core::InferenceClient;

use crate::server::ServerError;

// ============================================================================
// SECTION: Modules
// ============================================================================

mod messages;
mod offline;

pub use messages::MessagesClient;
pub use offline::KeywordClient;

// ============================================================================
// SECTION: Construction
// ============================================================================

/// Builds the configured inference backend.
///
/// `lookup` resolves environment variables; the messages backend reads its
/// API key through it.
///
/// # Errors
///
/// Returns [`ServerError::Init`] when the HTTP client cannot be built.
pub fn build_inference_client<F>(
    config: &InferenceConfig,
    lookup: F,
) -> Result<Arc<dyn InferenceClient>, ServerError>
where
    F: Fn(&str) -> Option<String>,
{
    match config.backend {
        InferenceBackend::Messages => {
            let api_key = lookup(&config.api_key_env).filter(|key| !key.trim().is_empty());
            if api_key.is_none() {
                tracing::warn!(
                    api_key_env = %config.api_key_env,
                    "inference api key not set; requests are sent without x-api-key"
                );
            }
            let client = MessagesClient::new(config, api_key)?;
            Ok(Arc::new(client))
        }
        InferenceBackend::Offline => {
            tracing::info!("using offline keyword inference backend");
            Ok(Arc::new(KeywordClient::new()))
        }
    }
}
