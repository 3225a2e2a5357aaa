//! Completion client: asks an OpenAI-compatible chat-completions endpoint
//! for a supportive reply.
//!
//! # Public API
//!
//! - [`CompletionClient::get_response`] — never fails; returns
//!   [`FALLBACK_RESPONSE`] when the upstream call does not succeed
//! - [`CompletionClient::complete`] — the same call with the error exposed
//! - [`support_prompt`] — user message built from the two form fields
//!
//! Each request is bounded by [`CompletionConfig::timeout`]. Transport
//! failures and 5xx responses are retried up to
//! [`CompletionConfig::max_attempts`] in total; everything else falls back
//! immediately.

pub mod config;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, warn};

pub use config::{CompletionConfig, ConfigError};

/// Static instruction sent ahead of every user message.
pub const SYSTEM_PROMPT: &str = "You are a compassionate addiction support assistant. \
Respond in a calm, supportive, and empathetic tone. \
Avoid giving medical advice. Always suggest professional help if needed.";

/// Returned in place of a generated reply whenever the upstream call fails.
pub const FALLBACK_RESPONSE: &str = "I'm sorry, I'm having trouble responding right now. \
If you're struggling, please reach out to a professional for support.";

/// Errors from a single completion call. Only visible through
/// [`CompletionClient::complete`].
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl CompletionError {
    fn is_retryable(&self) -> bool {
        match self {
            CompletionError::Transport(_) => true,
            CompletionError::Status { status, .. } => status.is_server_error(),
            CompletionError::Malformed(_) => false,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Builds the user message for a submission.
pub fn support_prompt(addiction_type: &str, description: &str) -> String {
    format!("I am struggling with {addiction_type}. Here's what I'm going through: {description}")
}

/// HTTP client for the chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    http: Client,
    config: CompletionConfig,
}

impl CompletionClient {
    /// Creates a client whose requests time out after `config.timeout`.
    pub fn new(config: CompletionConfig) -> Result<Self, CompletionError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    /// Returns a supportive reply for `user_input`, or [`FALLBACK_RESPONSE`]
    /// if the upstream call fails for any reason.
    pub async fn get_response(&self, user_input: &str) -> String {
        match self.complete(user_input).await {
            Ok(content) => content,
            Err(e) => {
                warn!(error = %e, endpoint = %self.config.endpoint, "completion failed, using fallback");
                FALLBACK_RESPONSE.to_string()
            }
        }
    }

    /// Calls the endpoint, retrying transport failures and 5xx responses.
    pub async fn complete(&self, user_input: &str) -> Result<String, CompletionError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: user_input,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.send(&request).await {
                Ok(content) => return Ok(content),
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    warn!(error = %e, attempt, "completion attempt failed, retrying");
                    sleep(self.config.retry_backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send(&self, request: &ChatRequest<'_>) -> Result<String, CompletionError> {
        let resp = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(CompletionError::Status { status, body });
        }

        debug!(%status, bytes = body.len(), "completion response received");
        extract_content(&body)
    }
}

/// Pulls `choices[0].message.content` out of a response body, trimmed.
fn extract_content(body: &str) -> Result<String, CompletionError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| CompletionError::Malformed(format!("{e}; body: {body}")))?;

    let content = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| CompletionError::Malformed(format!("no choices; body: {body}")))?
        .message
        .content
        .ok_or_else(|| CompletionError::Malformed(format!("no message content; body: {body}")))?;

    let content = content.trim();
    if content.is_empty() {
        return Err(CompletionError::Malformed("empty message content".into()));
    }
    Ok(content.to_string())
}
