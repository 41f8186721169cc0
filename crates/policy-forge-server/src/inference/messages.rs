// crates/policy-forge-server/src/inference/messages.rs
// ============================================================================
// Module: Messages API Client
// Description: Blocking HTTP client for a hosted messages inference API.
// Purpose: Send one prompt and return the first text block of the reply.
// Dependencies: reqwest, serde, serde_json
// ============================================================================

//! ## Overview
//! [`MessagesClient`] sends `{model, max_tokens, system, messages}` to the
//! configured endpoint and returns `content[0].text` from the reply. Every
//! call is bounded by the configured timeout and the response body is read
//! with a hard byte cap. Redirects are not followed. Failures are reported
//! as [`UpstreamError`] and never retried.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::ErrorKind;
use std::io::Read;

use policy_forge_config::InferenceConfig;
use policy_forge_core::InferenceClient;
use policy_forge_core::InferenceRequest;
use policy_forge_core::UpstreamError;
use policy_forge_core::request::truncate_chars;
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::blocking::Response;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde::Serialize;

use crate::server::ServerError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-api-key";
/// Header carrying the API version.
const API_VERSION_HEADER: &str = "anthropic-version";
/// User agent sent with every request.
const USER_AGENT: &str = concat!("policy-forge/", env!("CARGO_PKG_VERSION"));
/// Maximum characters of an error body kept in [`UpstreamError::Status`].
const ERROR_EXCERPT_CHARS: usize = 512;

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Request body for the messages API.
#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    /// Model identifier.
    model: &'a str,
    /// Output token cap.
    max_tokens: u32,
    /// System instructions.
    system: &'a str,
    /// Conversation turns; always a single user turn.
    messages: [Message<'a>; 1],
}

/// One conversation turn.
#[derive(Debug, Serialize)]
struct Message<'a> {
    /// Speaker role.
    role: &'static str,
    /// Turn text.
    content: &'a str,
}

/// Reply body from the messages API.
#[derive(Debug, Deserialize)]
struct MessagesReply {
    /// Content blocks in reply order.
    #[serde(default)]
    content: Vec<ContentBlock>,
}

/// One reply content block.
#[derive(Debug, Deserialize)]
struct ContentBlock {
    /// Block text, present on text blocks.
    #[serde(default)]
    text: Option<String>,
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Blocking client for the messages inference API.
#[derive(Debug)]
pub struct MessagesClient {
    /// Underlying HTTP client with timeout applied.
    client: Client,
    /// Messages endpoint.
    endpoint: Url,
    /// API key sent as `x-api-key`, if configured.
    api_key: Option<String>,
    /// API version header value.
    api_version: String,
    /// Maximum reply body size in bytes.
    max_response_bytes: usize,
}

impl MessagesClient {
    /// Builds a client from inference configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Init`] when the endpoint is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: &InferenceConfig, api_key: Option<String>) -> Result<Self, ServerError> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|err| ServerError::Init(format!("invalid inference endpoint: {err}")))?;
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .redirect(Policy::none())
            .build()
            .map_err(|err| ServerError::Init(format!("inference client build failed: {err}")))?;
        Ok(Self {
            client,
            endpoint,
            api_key,
            api_version: config.api_version.clone(),
            max_response_bytes: config.max_response_bytes,
        })
    }

    /// Returns the endpoint requests are sent to.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl InferenceClient for MessagesClient {
    fn complete(&self, request: &InferenceRequest) -> Result<String, UpstreamError> {
        let body = MessagesRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            system: &request.system,
            messages: [Message {
                role: "user",
                content: &request.user_message,
            }],
        };
        let mut builder = self
            .client
            .post(self.endpoint.clone())
            .header(API_VERSION_HEADER, &self.api_version)
            .json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        let mut response = builder.send().map_err(|err| map_send_error(&err))?;
        let status = response.status();
        if !status.is_success() {
            let excerpt = read_response_limited(&mut response, self.max_response_bytes)
                .map(|bytes| error_excerpt(&bytes))
                .unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: excerpt,
            });
        }
        let bytes = read_response_limited(&mut response, self.max_response_bytes)?;
        parse_reply(&bytes)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Extracts the first content block's text from a reply body.
fn parse_reply(bytes: &[u8]) -> Result<String, UpstreamError> {
    let reply: MessagesReply = serde_json::from_slice(bytes)
        .map_err(|err| UpstreamError::InvalidReply(format!("reply is not valid json: {err}")))?;
    reply
        .content
        .into_iter()
        .next()
        .and_then(|block| block.text)
        .ok_or(UpstreamError::MissingText)
}

/// Returns a bounded, lossy text excerpt of an error body.
fn error_excerpt(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    truncate_chars(text.trim(), ERROR_EXCERPT_CHARS).to_string()
}

/// Maps a send failure onto an upstream error.
fn map_send_error(error: &reqwest::Error) -> UpstreamError {
    if error.is_timeout() {
        UpstreamError::Timeout
    } else {
        UpstreamError::Transport(error.to_string())
    }
}

/// Reads the response body while enforcing a byte limit.
fn read_response_limited(
    response: &mut Response,
    max_bytes: usize,
) -> Result<Vec<u8>, UpstreamError> {
    let limit = u64::try_from(max_bytes)
        .map_err(|_| UpstreamError::InvalidReply("response size limit exceeds u64".to_string()))?;
    if let Some(expected) = response.content_length()
        && expected > limit
    {
        return Err(UpstreamError::InvalidReply("reply exceeds size limit".to_string()));
    }
    let mut buf = Vec::new();
    response.take(limit.saturating_add(1)).read_to_end(&mut buf).map_err(|err| {
        if err.kind() == ErrorKind::TimedOut {
            UpstreamError::Timeout
        } else {
            UpstreamError::Transport(format!("failed to read reply: {err}"))
        }
    })?;
    if buf.len() > max_bytes {
        return Err(UpstreamError::InvalidReply("reply exceeds size limit".to_string()));
    }
    Ok(buf)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions.")]

    use policy_forge_core::UpstreamError;

    use super::parse_reply;

    #[test]
    fn first_text_block_is_returned() {
        let reply = br#"{"id":"msg_1","content":[{"type":"text","text":"first"},{"type":"text","text":"second"}]}"#;
        assert_eq!(parse_reply(reply).unwrap(), "first");
    }

    #[test]
    fn empty_content_is_missing_text() {
        assert_eq!(parse_reply(br#"{"content":[]}"#), Err(UpstreamError::MissingText));
        assert_eq!(parse_reply(br"{}"), Err(UpstreamError::MissingText));
        assert_eq!(
            parse_reply(br#"{"content":[{"type":"tool_use"}]}"#),
            Err(UpstreamError::MissingText)
        );
    }

    #[test]
    fn non_json_reply_is_invalid() {
        assert!(matches!(parse_reply(b"<html>"), Err(UpstreamError::InvalidReply(_))));
    }
}
