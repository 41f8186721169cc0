// crates/policy-forge-server/src/logging.rs
// ============================================================================
// Module: Tracing Setup
// Description: Global tracing subscriber installation.
// Purpose: Emit structured request logs in text or JSON form.
// Dependencies: policy-forge-config, tracing-subscriber
// ============================================================================

//! ## Overview
//! Installs a `tracing-subscriber` formatter filtered by the configured log
//! level. When `RUST_LOG` is set it takes precedence over the config value.
//! Installation is idempotent: a second call reports that a subscriber is
//! already present instead of replacing it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use policy_forge_config::LogFormat;
use policy_forge_config::LoggingConfig;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Initialization
// ============================================================================

/// Builds the level filter for `config`, preferring `RUST_LOG` when set.
#[must_use]
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.level.as_str()))
}

/// Installs the global tracing subscriber.
///
/// Returns `false` when a global subscriber was already installed.
#[must_use]
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter = env_filter(config);
    let result = match config.format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_current_span(true)
            .with_writer(std::io::stderr)
            .try_init(),
    };
    result.is_ok()
}
