//! Relay between the coaching chat and an OpenAI-compatible completion API.
//!
//! Every call builds its own HTTP client from a [`ChatConfig`]; there is no
//! shared client instance.

use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Instruction sent ahead of every user message.
pub const SYSTEM_PROMPT: &str = "You are an expert AI personal trainer. Your goal is to give \
clear, well-structured workout plans and nutrition advice.";

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_TOKENS: u32 = 200;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Environment variables consulted by [`ChatConfig::from_env`], in priority order
/// for the API key.
pub const API_KEY_ENVS: [&str; 2] = ["GYMCOACH_OPENAI_API_KEY", "OPENAI_API_KEY"];
pub const BASE_URL_ENV: &str = "GYMCOACH_CHAT_BASE_URL";
pub const MODEL_ENV: &str = "GYMCOACH_CHAT_MODEL";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Connection settings for the completion API.
#[derive(Clone)]
pub struct ChatConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    /// Upper bound on generated tokens per reply.
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ChatConfig {
    /// Build a config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let api_key = first_api_key(|name| std::env::var(name).ok());
        let base_url = std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned());
        let model = std::env::var(MODEL_ENV).unwrap_or_else(|_| DEFAULT_MODEL.to_owned());
        Self {
            api_key,
            base_url,
            model,
            ..Self::default()
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// First non-blank value among [`API_KEY_ENVS`].
fn first_api_key(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    API_KEY_ENVS
        .iter()
        .find_map(|name| lookup(name).filter(|k| !k.trim().is_empty()))
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure of a relay call.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("chat assistant is not configured: no API key set")]
    MissingCredential,

    #[error("failed to build HTTP client: {0}")]
    Client(reqwest::Error),

    #[error("completion request failed: {0}")]
    Transport(reqwest::Error),

    #[error("completion API returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("completion API returned no content")]
    EmptyResponse,
}

impl ChatError {
    /// True when the relay cannot run at all because of local configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingCredential | Self::Client(_))
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [WireMessage<'a>; 2],
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

fn upstream_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_owned(),
        Err(_) => body.trim().to_owned(),
    }
}

// ---------------------------------------------------------------------------
// Relay
// ---------------------------------------------------------------------------

/// Send `message` behind [`SYSTEM_PROMPT`] and return the model's reply
/// unchanged. No retries.
pub async fn relay(config: &ChatConfig, message: &str) -> Result<String, ChatError> {
    let api_key = config
        .api_key
        .as_deref()
        .ok_or(ChatError::MissingCredential)?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(ChatError::Client)?;

    let request = CompletionRequest {
        model: &config.model,
        messages: [
            WireMessage {
                role: "system",
                content: SYSTEM_PROMPT,
            },
            WireMessage {
                role: "user",
                content: message,
            },
        ],
        max_tokens: config.max_tokens,
    };

    debug!(model = %config.model, message_len = message.len(), "sending chat completion");

    let response = client
        .post(config.completions_url())
        .bearer_auth(api_key)
        .json(&request)
        .send()
        .await
        .map_err(ChatError::Transport)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = upstream_message(status, &body);
        warn!(status = status.as_u16(), %message, "completion API error");
        return Err(ChatError::Upstream {
            status: status.as_u16(),
            message,
        });
    }

    let parsed: CompletionResponse = response.json().await.map_err(ChatError::Transport)?;
    let reply = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or(ChatError::EmptyResponse)?;

    info!(model = %config.model, reply_len = reply.len(), "chat reply received");
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_hosted_api() {
        let cfg = ChatConfig::default();
        assert_eq!(cfg.model, "gpt-4o-mini");
        assert_eq!(cfg.max_tokens, 200);
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn completions_url_tolerates_trailing_slash() {
        let cfg = ChatConfig {
            base_url: "http://localhost:9999/v1/".to_owned(),
            ..ChatConfig::default()
        };
        assert_eq!(cfg.completions_url(), "http://localhost:9999/v1/chat/completions");
    }

    #[test]
    fn blank_key_falls_through_to_next_variable() {
        let lookup = |name: &str| match name {
            "GYMCOACH_OPENAI_API_KEY" => Some("   ".to_owned()),
            "OPENAI_API_KEY" => Some("sk-openai".to_owned()),
            _ => None,
        };
        assert_eq!(first_api_key(lookup).as_deref(), Some("sk-openai"));

        let preferred = |name: &str| Some(format!("sk-{name}"));
        assert_eq!(
            first_api_key(preferred).as_deref(),
            Some("sk-GYMCOACH_OPENAI_API_KEY")
        );
        assert_eq!(first_api_key(|_| Some(String::new())), None);
    }

    #[test]
    fn debug_output_redacts_key() {
        let cfg = ChatConfig {
            api_key: Some("sk-very-secret".to_owned()),
            ..ChatConfig::default()
        };
        let printed = format!("{cfg:?}");
        assert!(!printed.contains("sk-very-secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn upstream_message_prefers_structured_error() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
        assert_eq!(
            upstream_message(StatusCode::UNAUTHORIZED, body),
            "Incorrect API key provided"
        );
        assert_eq!(upstream_message(StatusCode::BAD_GATEWAY, "  "), "Bad Gateway");
        assert_eq!(upstream_message(StatusCode::BAD_GATEWAY, "oops"), "oops");
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let err = relay(&ChatConfig::default(), "hello").await.unwrap_err();
        assert!(matches!(err, ChatError::MissingCredential));
        assert!(err.is_configuration());
    }
}
