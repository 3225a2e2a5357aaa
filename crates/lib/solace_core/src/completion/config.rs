//! Completion client configuration.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Environment variable holding the upstream API credential.
pub const API_KEY_ENV: &str = "XAI_API_KEY";

pub const DEFAULT_ENDPOINT: &str = "https://api.x.ai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "grok-3";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 150;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// One try plus one retry.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Startup configuration errors. These are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    MissingCredential(&'static str),
}

/// Settings for the outbound chat-completion call.
#[derive(Clone)]
pub struct CompletionConfig {
    /// Bearer credential sent with every request.
    pub api_key: String,
    /// Full URL of the chat-completions endpoint.
    pub endpoint: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Per-attempt request timeout.
    pub timeout: Duration,
    /// Total attempts before falling back, at least 1.
    pub max_attempts: u32,
    /// Pause between attempts.
    pub retry_backoff: Duration,
}

impl CompletionConfig {
    /// Builds a config with defaults for everything except the credential.
    ///
    /// A missing or blank credential is rejected so the server never starts
    /// without one.
    pub fn new(api_key: Option<String>) -> Result<Self, ConfigError> {
        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingCredential(API_KEY_ENV))?;

        Ok(Self {
            api_key,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: DEFAULT_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        })
    }
}

impl fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .field("max_attempts", &self.max_attempts)
            .field("retry_backoff", &self.retry_backoff)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_is_rejected() {
        let err = CompletionConfig::new(None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential("XAI_API_KEY")));
        assert_eq!(err.to_string(), "XAI_API_KEY environment variable not set");
    }

    #[test]
    fn blank_credential_is_rejected() {
        assert!(CompletionConfig::new(Some(String::new())).is_err());
        assert!(CompletionConfig::new(Some("   ".into())).is_err());
    }

    #[test]
    fn defaults_match_upstream_contract() {
        let config = CompletionConfig::new(Some("key".into())).unwrap();
        assert_eq!(config.api_key, "key");
        assert_eq!(config.endpoint, "https://api.x.ai/v1/chat/completions");
        assert_eq!(config.model, "grok-3");
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.max_tokens, 150);
        assert_eq!(config.max_attempts, 2);
    }

    #[test]
    fn debug_output_hides_credential() {
        let config = CompletionConfig::new(Some("super-secret".into())).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
