//! OpenAI legacy completions client.
//!
//! Minimal, non-streaming client around `POST {endpoint}/v1/completions`.
//! The proxy only ever needs the first choice's text.
//!
//! Constructor validation:
//! - `cfg.endpoint` must start with http:// or https://
//! - `cfg.model` must not be empty
//!
//! A missing `cfg.api_key` is accepted at construction time; [`OpenAiService::complete`]
//! then fails with `MissingApiKey` without touching the network.
//!
//! Errors are normalized via unified error types in `error_handler`.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::{
    config::completion_config::CompletionConfig,
    error_handler::{
        CompletionError, ConfigError, HttpError, ProviderError, ProviderErrorKind, make_snippet,
    },
};

/// Thin client for the OpenAI completions API.
///
/// Constructed from a complete [`CompletionConfig`]. Internally keeps a
/// preconfigured `reqwest::Client` (default headers, optional timeout).
#[derive(Debug)]
pub struct OpenAiService {
    client: reqwest::Client,
    cfg: CompletionConfig,
    url_completions: String,
}

impl OpenAiService {
    /// Creates a new [`OpenAiService`] from the given config.
    ///
    /// # Errors
    /// - [`CompletionError::Provider`] with `InvalidEndpoint` if `cfg.endpoint` is invalid
    /// - [`CompletionError::Config`] with `EmptyModel` if `cfg.model` is blank
    /// - [`CompletionError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: CompletionConfig) -> Result<Self, CompletionError> {
        // 1) Endpoint must use http/https.
        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(ProviderError::new(ProviderErrorKind::InvalidEndpoint(
                cfg.endpoint.clone(),
            ))
            .into());
        }

        // 2) Model must be named.
        if cfg.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel.into());
        }

        // 3) HTTP client: default headers + optional timeout.
        let mut headers = header::HeaderMap::new();
        if let Some(key) = cfg.api_key.as_deref() {
            let mut value = header::HeaderValue::from_str(&format!("Bearer {key}")).map_err(|e| {
                ProviderError::new(ProviderErrorKind::Decode(format!(
                    "invalid API key header: {e}"
                )))
            })?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(secs) = cfg.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        let url_completions = format!("{}/v1/completions", endpoint.trim_end_matches('/'));

        info!(
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            has_api_key = cfg.api_key.is_some(),
            timeout_secs = ?cfg.timeout_secs,
            "OpenAiService initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_completions,
        })
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &CompletionConfig {
        &self.cfg
    }

    /// Performs a **non-streaming** completion request (`/v1/completions`) and
    /// returns the first choice's text with surrounding whitespace trimmed.
    ///
    /// # Errors
    /// - [`CompletionError::Provider`] with `MissingApiKey` when no key is configured
    /// - [`CompletionError::Provider`] with `HttpStatus` for non-2xx responses
    /// - [`CompletionError::HttpTransport`] for client/network failures
    /// - [`CompletionError::Provider`] with `Decode` if the JSON cannot be parsed
    /// - [`CompletionError::Provider`] with `EmptyChoices` if no choices are returned
    pub async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        if self.cfg.api_key.is_none() {
            warn!(model = %self.cfg.model, "completion requested without an API key");
            return Err(ProviderError::new(ProviderErrorKind::MissingApiKey).into());
        }

        let started = Instant::now();
        let body = CompletionRequest::from_cfg(&self.cfg, prompt);

        debug!(
            model = %self.cfg.model,
            prompt_len = prompt.len(),
            "POST {}", self.url_completions
        );

        let resp = self
            .client
            .post(&self.url_completions)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_completions.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);

            error!(
                %status,
                %url,
                %snippet,
                model = %self.cfg.model,
                latency_ms = started.elapsed().as_millis(),
                "OpenAI /v1/completions returned non-success status"
            );

            return Err(ProviderError::new(ProviderErrorKind::HttpStatus(HttpError {
                status,
                url,
                snippet,
            }))
            .into());
        }

        let out: CompletionResponse = match resp.json().await {
            Ok(v) => v,
            Err(e) => {
                error!(
                    error = %e,
                    model = %self.cfg.model,
                    latency_ms = started.elapsed().as_millis(),
                    "failed to decode /v1/completions response"
                );
                return Err(ProviderError::new(ProviderErrorKind::Decode(format!(
                    "serde error: {e}; expected `choices[0].text`"
                )))
                .into());
            }
        };

        let text = out
            .first_text()
            .ok_or_else(|| ProviderError::new(ProviderErrorKind::EmptyChoices))?;

        info!(
            model = %self.cfg.model,
            latency_ms = started.elapsed().as_millis(),
            answer_len = text.len(),
            "completion finished"
        );

        Ok(text)
    }
}

/* ===========================================================================
HTTP payloads
======================================================================== */

/// Request body for `/v1/completions`.
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

impl<'a> CompletionRequest<'a> {
    fn from_cfg(cfg: &'a CompletionConfig, prompt: &'a str) -> Self {
        Self {
            model: &cfg.model,
            prompt,
            max_tokens: cfg.max_tokens,
            temperature: cfg.temperature,
        }
    }
}

/// Minimal response for `/v1/completions`.
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    text: Option<String>,
}

impl CompletionResponse {
    fn first_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.text)
            .map(|t| t.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_carries_config_knobs() {
        let cfg = CompletionConfig::default();
        let body = serde_json::to_value(CompletionRequest::from_cfg(&cfg, "Summarize")).unwrap();

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["prompt"], "Summarize");
        assert_eq!(body["max_tokens"], 100);
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn first_choice_is_trimmed() {
        let out: CompletionResponse =
            serde_json::from_str(r#"{"choices":[{"text":"\n\n Hello. "},{"text":"other"}]}"#)
                .unwrap();
        assert_eq!(out.first_text().as_deref(), Some("Hello."));
    }

    #[test]
    fn missing_choices_yield_none() {
        let out: CompletionResponse = serde_json::from_str(r#"{"id":"x"}"#).unwrap();
        assert!(out.first_text().is_none());
    }

    #[test]
    fn rejects_non_http_endpoint() {
        let cfg = CompletionConfig {
            endpoint: "ftp://example.com".into(),
            ..CompletionConfig::default()
        };
        let err = OpenAiService::new(cfg).unwrap_err();
        assert_eq!(err.code(), "INVALID_ENDPOINT");
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let cfg = CompletionConfig {
            // Unroutable on purpose: the call must short-circuit before sending.
            endpoint: "http://127.0.0.1:9".into(),
            ..CompletionConfig::default()
        };
        let svc = OpenAiService::new(cfg).unwrap();
        let err = svc.complete("hi").await.unwrap_err();
        assert_eq!(err.code(), "MISSING_API_KEY");
    }
}
