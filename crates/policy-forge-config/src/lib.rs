// crates/policy-forge-config/src/lib.rs
// ============================================================================
// Module: Policy Forge Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for policy-forge.toml semantics.
// Dependencies: policy-forge-core, serde, toml, url
// ============================================================================

//! ## Overview
//! `policy-forge-config` defines the configuration model for the policy
//! generation service. Configuration is loaded once at startup, adjusted by
//! a small set of environment overrides, validated fail-closed, and then
//! passed explicitly into the server and handler.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
