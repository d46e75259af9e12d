//! Session configuration. Everything the session needs is passed in; nothing
//! is read from globals after construction.

use std::time::Duration;

use crate::error::ConfigError;

/// Delays used by the simulated streaming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealPacing {
    /// Pause before each revealed character of a chat answer.
    pub char_delay: Duration,
    /// Pause before each revealed suggested question.
    pub question_delay: Duration,
}

impl Default for RevealPacing {
    fn default() -> Self {
        Self {
            char_delay: Duration::from_millis(20),
            question_delay: Duration::from_millis(500),
        }
    }
}

/// Runtime configuration for [`crate::ChatSession`] and [`crate::HttpBackend`].
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Base URL of the contract backend, e.g. `http://127.0.0.1:8000`.
    pub api_base_url: String,
    pub pacing: RevealPacing,
    /// `None` keeps the transport default (no timeout).
    pub request_timeout: Option<Duration>,
    /// Buffer size of the event channel; slow subscribers skip older events.
    pub event_capacity: usize,
}

impl SessionConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            pacing: RevealPacing::default(),
            request_timeout: None,
            event_capacity: 1024,
        }
    }

    /// Build from environment variables.
    ///
    /// - `CONTRACT_CHAT_API_URL` (required)
    /// - `CHAT_CHAR_DELAY_MS` (default 20)
    /// - `QUESTION_DELAY_MS` (default 500)
    /// - `CONTRACT_CHAT_TIMEOUT_SECS` (optional)
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base_url = env_opt("CONTRACT_CHAT_API_URL")
            .ok_or(ConfigError::MissingVar("CONTRACT_CHAT_API_URL"))?;

        let mut cfg = Self::new(api_base_url);
        cfg.validate()?;

        if let Some(ms) = env_opt_u64("CHAT_CHAR_DELAY_MS")? {
            cfg.pacing.char_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = env_opt_u64("QUESTION_DELAY_MS")? {
            cfg.pacing.question_delay = Duration::from_millis(ms);
        }
        cfg.request_timeout = env_opt_u64("CONTRACT_CHAT_TIMEOUT_SECS")?.map(Duration::from_secs);

        Ok(cfg)
    }

    /// Checks that the base URL uses http/https.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api_base_url.trim();
        if url.starts_with("http://") || url.starts_with("https://") {
            Ok(())
        } else {
            Err(ConfigError::InvalidUrl(self.api_base_url.clone()))
        }
    }

    pub fn chat_url(&self) -> String {
        self.endpoint("chat-contract/")
    }

    pub fn questions_url(&self) -> String {
        self.endpoint("generate-questions/")
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.api_base_url.trim().trim_end_matches('/'))
    }
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_opt_u64(name: &'static str) -> Result<Option<u64>, ConfigError> {
    env_opt(name)
        .map(|v| {
            v.trim().parse::<u64>().map_err(|_| ConfigError::InvalidNumber {
                var: name,
                reason: "expected u64",
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_join_cleanly() {
        let cfg = SessionConfig::new("http://localhost:8000/");
        assert_eq!(cfg.chat_url(), "http://localhost:8000/chat-contract/");
        assert_eq!(
            cfg.questions_url(),
            "http://localhost:8000/generate-questions/"
        );

        let cfg = SessionConfig::new("https://api.example.com/v1");
        assert_eq!(cfg.chat_url(), "https://api.example.com/v1/chat-contract/");
    }

    #[test]
    fn default_pacing_matches_ui() {
        let p = RevealPacing::default();
        assert_eq!(p.char_delay, Duration::from_millis(20));
        assert_eq!(p.question_delay, Duration::from_millis(500));
    }

    #[test]
    fn rejects_non_http_base() {
        assert!(SessionConfig::new("localhost:8000").validate().is_err());
        assert!(SessionConfig::new("http://localhost:8000").validate().is_ok());
    }
}
