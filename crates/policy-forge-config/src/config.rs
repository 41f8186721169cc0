// crates/policy-forge-config/src/config.rs
// ============================================================================
// Module: Policy Forge Configuration
// Description: Configuration loading and validation for the policy service.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: policy-forge-core, serde, toml, url
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The path resolves from an explicit argument, then `POLICY_FORGE_CONFIG`,
//! then `policy-forge.toml` in the working directory when it exists; with no
//! file at all the built-in defaults apply. Two environment overrides are
//! applied after parsing: `POLICY_FORGE_MODEL_ID` and `POLICY_FORGE_LOG_LEVEL`.
//! Invalid configuration fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use policy_forge_core::DEFAULT_MAX_TOKENS;
use policy_forge_core::DEFAULT_MODEL_ID;
use policy_forge_core::GenerationSettings;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use url::Host;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "policy-forge.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "POLICY_FORGE_CONFIG";
/// Environment variable overriding the model identifier.
pub const MODEL_ID_ENV_VAR: &str = "POLICY_FORGE_MODEL_ID";
/// Environment variable overriding the log level.
pub const LOG_LEVEL_ENV_VAR: &str = "POLICY_FORGE_LOG_LEVEL";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Upper bound for `server.max_body_bytes`.
pub const MAX_BODY_BYTES_LIMIT: usize = 10 * 1024 * 1024;
/// Upper bound for `inference.max_response_bytes`.
pub const MAX_RESPONSE_BYTES_LIMIT: usize = 16 * 1024 * 1024;
/// Maximum model identifier length.
const MAX_MODEL_ID_LENGTH: usize = 256;
/// Lower bound for `inference.timeout_ms`.
const MIN_TIMEOUT_MS: u64 = 1_000;
/// Upper bound for `inference.timeout_ms`.
const MAX_TIMEOUT_MS: u64 = 300_000;

/// Default bind address.
const DEFAULT_BIND: &str = "127.0.0.1:8080";
/// Default request body limit.
const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;
/// Default inference endpoint.
const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
/// Default inference timeout in milliseconds.
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Default environment variable holding the API key.
const DEFAULT_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
/// Default messages API version header value.
const DEFAULT_API_VERSION: &str = "2023-06-01";
/// Default inference response size cap.
const DEFAULT_MAX_RESPONSE_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Top-Level Config
// ============================================================================

/// Policy Forge configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PolicyForgeConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Inference backend settings.
    #[serde(default)]
    pub inference: InferenceConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// File the configuration was loaded from, if any (not serialized).
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl PolicyForgeConfig {
    /// Loads configuration using the default resolution rules and the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, |key| env::var(key).ok())
    }

    /// Loads configuration with an explicit environment lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load_with_env<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match resolve_path(path, &lookup)? {
            Some(resolved) => Self::from_file(&resolved)?,
            None => Self::default(),
        };
        config.apply_env_overrides(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a config file without applying overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        validate_path(path)?;
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config = Self::from_toml_str(content)?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parses configuration from TOML text without validating it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the text is not valid config TOML.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Applies the model and log level environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when an override value is unusable.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model_id) = lookup(MODEL_ID_ENV_VAR) {
            let model_id = model_id.trim();
            if !model_id.is_empty() {
                self.inference.model_id = model_id.to_string();
            }
        }
        if let Some(level) = lookup(LOG_LEVEL_ENV_VAR) {
            let level = level.trim();
            if !level.is_empty() {
                self.logging.level = level.parse().map_err(|_| {
                    ConfigError::Invalid(format!("{LOG_LEVEL_ENV_VAR} has unknown level: {level}"))
                })?;
            }
        }
        Ok(())
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.inference.validate()?;
        Ok(())
    }

    /// Returns the generation settings fixed at startup.
    ///
    /// Only the model identifier is configurable; the output token cap is
    /// always [`DEFAULT_MAX_TOKENS`].
    #[must_use]
    pub fn generation_settings(&self) -> GenerationSettings {
        GenerationSettings {
            model_id: self.inference.model_id.clone(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

// ============================================================================
// SECTION: Server Config
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Socket address to bind.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum accepted request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    /// Returns the parsed bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the address does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("invalid bind address: {}", self.bind)))
    }

    /// Validates server transport configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "server.max_body_bytes must be greater than zero".to_string(),
            ));
        }
        if self.max_body_bytes > MAX_BODY_BYTES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "server.max_body_bytes must be at most {MAX_BODY_BYTES_LIMIT}"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Inference Config
// ============================================================================

/// Inference backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InferenceBackend {
    /// Hosted messages API over HTTPS.
    #[default]
    Messages,
    /// Deterministic local keyword generator.
    Offline,
}

impl InferenceBackend {
    /// Returns a stable label for the backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Messages => "messages",
            Self::Offline => "offline",
        }
    }
}

/// Inference backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InferenceConfig {
    /// Backend used to generate policies.
    #[serde(default)]
    pub backend: InferenceBackend,
    /// Messages API endpoint URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Model identifier sent with every request.
    #[serde(default = "default_model_id")]
    pub model_id: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Messages API version header value.
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Maximum inference response size in bytes.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
    /// Allow cleartext http to non-loopback hosts.
    #[serde(default)]
    pub allow_http: bool,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            backend: InferenceBackend::default(),
            endpoint: default_endpoint(),
            model_id: default_model_id(),
            timeout_ms: default_timeout_ms(),
            api_key_env: default_api_key_env(),
            api_version: default_api_version(),
            max_response_bytes: default_max_response_bytes(),
            allow_http: false,
        }
    }
}

impl InferenceConfig {
    /// Returns the request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Validates inference configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let model_id = self.model_id.trim();
        if model_id.is_empty() {
            return Err(ConfigError::Invalid("inference.model_id must be non-empty".to_string()));
        }
        if model_id.len() != self.model_id.len() {
            return Err(ConfigError::Invalid("inference.model_id must be trimmed".to_string()));
        }
        if self.model_id.len() > MAX_MODEL_ID_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "inference.model_id exceeds {MAX_MODEL_ID_LENGTH} characters"
            )));
        }
        if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "inference.timeout_ms must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS}"
            )));
        }
        if self.max_response_bytes == 0 || self.max_response_bytes > MAX_RESPONSE_BYTES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "inference.max_response_bytes must be between 1 and {MAX_RESPONSE_BYTES_LIMIT}"
            )));
        }
        if self.backend == InferenceBackend::Messages {
            self.validate_endpoint()?;
            if self.api_key_env.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "inference.api_key_env must be non-empty".to_string(),
                ));
            }
            if self.api_version.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "inference.api_version must be non-empty".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Validates the endpoint scheme and host.
    fn validate_endpoint(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.endpoint)
            .map_err(|err| ConfigError::Invalid(format!("inference.endpoint is invalid: {err}")))?;
        let host = url.host().ok_or_else(|| {
            ConfigError::Invalid("inference.endpoint must include a host".to_string())
        })?;
        match url.scheme() {
            "https" => Ok(()),
            "http" if self.allow_http || is_loopback_host(&host) => Ok(()),
            "http" => Err(ConfigError::Invalid(
                "inference.endpoint uses http for a non-loopback host; set allow_http".to_string(),
            )),
            scheme => Err(ConfigError::Invalid(format!(
                "inference.endpoint scheme must be http or https, got {scheme}"
            ))),
        }
    }
}

/// Returns true when the host refers to the local machine.
fn is_loopback_host(host: &Host<&str>) -> bool {
    match host {
        Host::Domain(name) => name.eq_ignore_ascii_case("localhost"),
        Host::Ipv4(addr) => addr.is_loopback(),
        Host::Ipv6(addr) => addr.is_loopback(),
    }
}

// ============================================================================
// SECTION: Logging Config
// ============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace and above.
    Trace,
    /// Debug and above.
    Debug,
    /// Info and above.
    #[default]
    Info,
    /// Warnings and errors.
    Warn,
    /// Errors only.
    Error,
}

impl LogLevel {
    /// Returns the filter directive for the level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(ConfigError::Invalid(format!("unknown log level: {value}"))),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Minimum level emitted.
    #[serde(default)]
    pub level: LogLevel,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the argument, the environment, or the
/// default filename when present.
fn resolve_path<F>(path: Option<&Path>, lookup: &F) -> Result<Option<PathBuf>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = path {
        return Ok(Some(path.to_path_buf()));
    }
    if let Some(env_path) = lookup(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(Some(PathBuf::from(env_path)));
    }
    let default_path = PathBuf::from(DEFAULT_CONFIG_NAME);
    Ok(default_path.is_file().then_some(default_path))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Default bind address.
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// Default request body limit.
const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Default inference endpoint.
fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

/// Default model identifier.
fn default_model_id() -> String {
    DEFAULT_MODEL_ID.to_string()
}

/// Default inference timeout.
const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Default API key environment variable.
fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

/// Default messages API version.
fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

/// Default inference response size cap.
const fn default_max_response_bytes() -> usize {
    DEFAULT_MAX_RESPONSE_BYTES
}

// ============================================================================
// SECTION: Tests
// ============================================================================
