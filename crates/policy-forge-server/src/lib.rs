// crates/policy-forge-server/src/lib.rs
// ============================================================================
// Module: Policy Forge Server Library
// Description: HTTP transport and inference backends for policy generation.
// Purpose: Expose the core handler over HTTP with correlation and tracing.
// Dependencies: policy-forge-core, policy-forge-config, axum, reqwest, tokio
// ============================================================================

//! ## Overview
//! `policy-forge-server` wires the request handler from `policy-forge-core`
//! to an axum HTTP router, builds the configured inference backend, issues
//! correlation identifiers, and installs the tracing subscriber.
//!
//! Request bodies and correlation headers are untrusted input; both are
//! bounded before they reach the handler.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod correlation;
pub mod inference;
pub mod logging;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use correlation::CorrelationIdGenerator;
pub use correlation::CorrelationIdRejection;
pub use correlation::RequestCorrelation;
pub use inference::KeywordClient;
pub use inference::MessagesClient;
pub use inference::build_inference_client;
pub use logging::init_tracing;
pub use server::PolicyServer;
pub use server::ServerError;
