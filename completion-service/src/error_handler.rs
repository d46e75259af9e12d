//! Unified error handling for `completion-service`.
//!
//! This module exposes a single top-level error type [`CompletionError`] for the
//! whole library, and groups domain-specific errors in nested enums (e.g.,
//! [`ConfigError`], [`ProviderError`]). Small helpers for reading environment
//! variables are provided and return the unified [`Result<T>`] alias.
//!
//! All messages include the suffix `[Completion Service]` to simplify attribution in logs.

use reqwest::StatusCode;
use thiserror::Error;

/* ------------------------------------------------------------------------- */
/* Public result alias                                                       */
/* ------------------------------------------------------------------------- */

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, CompletionError>;

/* ------------------------------------------------------------------------- */
/* Top-level error                                                           */
/* ------------------------------------------------------------------------- */

/// Top-level error for the `completion-service` crate.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Configuration/validation errors (startup/readiness).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Upstream provider errors (auth, status, decoding, empty payloads).
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Underlying HTTP transport error (e.g., `reqwest::Error`).
    #[error("[Completion Service] transport error: {0}")]
    HttpTransport(#[from] reqwest::Error),
}

impl CompletionError {
    /// Stable, machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            CompletionError::Config(_) => "CONFIG_ERROR",
            CompletionError::HttpTransport(_) => "UPSTREAM_TRANSPORT",
            CompletionError::Provider(p) => match p.kind {
                ProviderErrorKind::MissingApiKey => "MISSING_API_KEY",
                ProviderErrorKind::InvalidEndpoint(_) => "INVALID_ENDPOINT",
                ProviderErrorKind::HttpStatus(_) => "UPSTREAM_STATUS",
                ProviderErrorKind::Decode(_) => "UPSTREAM_DECODE",
                ProviderErrorKind::EmptyChoices => "UPSTREAM_EMPTY",
            },
        }
    }
}

/* ------------------------------------------------------------------------- */
/* Config errors                                                             */
/* ------------------------------------------------------------------------- */

/// Error enum for environment/config-driven setup.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A number failed to parse (like token limits, timeouts).
    #[error("[Completion Service] invalid number in {var}: {reason}")]
    InvalidNumber {
        /// Variable name (e.g., `OPENAI_MAX_TOKENS`).
        var: &'static str,
        /// Human-readable reason (e.g., `expected u32`).
        reason: &'static str,
    },

    /// A numeric field was outside of the allowed range.
    #[error("[Completion Service] {field} is out of range: {detail}")]
    OutOfRange {
        /// Field name (e.g., `temperature`).
        field: &'static str,
        /// Description of the expected range.
        detail: &'static str,
    },

    /// Model name was empty.
    #[error("[Completion Service] model name must not be empty")]
    EmptyModel,
}

/* ------------------------------------------------------------------------- */
/* Provider errors                                                           */
/* ------------------------------------------------------------------------- */

/// Non-success HTTP response details.
#[derive(Debug)]
pub struct HttpError {
    /// Numeric HTTP status code.
    pub status: StatusCode,
    /// Request URL.
    pub url: String,
    /// Short snippet of the response body (trimmed).
    pub snippet: String,
}

/// What went wrong while talking to the completion provider.
#[non_exhaustive]
#[derive(Debug)]
pub enum ProviderErrorKind {
    /// No credential was configured.
    MissingApiKey,
    /// The endpoint is empty or does not start with http/https.
    InvalidEndpoint(String),
    /// Upstream returned a non-successful HTTP status.
    HttpStatus(HttpError),
    /// Response payload could not be decoded as expected.
    Decode(String),
    /// Upstream answered without any choice.
    EmptyChoices,
}

/// Error raised by the upstream completion client.
#[derive(Debug, Error)]
#[error("[Completion Service] {kind}")]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind) -> Self {
        Self { kind }
    }
}

impl std::fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderErrorKind::MissingApiKey => write!(f, "API key is not configured"),
            ProviderErrorKind::InvalidEndpoint(e) => write!(f, "invalid endpoint: {e}"),
            ProviderErrorKind::HttpStatus(h) => {
                write!(f, "HTTP {} from {}: {}", h.status, h.url, h.snippet)
            }
            ProviderErrorKind::Decode(msg) => write!(f, "decode error: {msg}"),
            ProviderErrorKind::EmptyChoices => write!(f, "response contained no choices"),
        }
    }
}

/// Trims a response body down to something that fits in one log line.
pub fn make_snippet(text: &str) -> String {
    const MAX: usize = 240;
    let trimmed = text.trim();
    match trimmed.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}…", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

/* ------------------------------------------------------------------------- */
/* Env helpers (return unified `Result<T>`)                                  */
/* ------------------------------------------------------------------------- */

/// Reads an optional, non-empty environment variable.
pub fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parses an optional `u32` from env (`Ok(None)` if unset/empty).
///
/// # Errors
/// Returns [`ConfigError::InvalidNumber`] if the variable is set but not a valid `u32`.
pub fn env_opt_u32(name: &'static str) -> Result<Option<u32>> {
    match env_opt(name) {
        Some(v) => v.trim().parse::<u32>().map(Some).map_err(|_| {
            CompletionError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected u32",
            })
        }),
        None => Ok(None),
    }
}

/// Parses an optional `u64` from env (`Ok(None)` if unset/empty).
pub fn env_opt_u64(name: &'static str) -> Result<Option<u64>> {
    match env_opt(name) {
        Some(v) => v.trim().parse::<u64>().map(Some).map_err(|_| {
            CompletionError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected u64",
            })
        }),
        None => Ok(None),
    }
}

/// Parses an optional `f32` from env (`Ok(None)` if unset/empty).
pub fn env_opt_f32(name: &'static str) -> Result<Option<f32>> {
    match env_opt(name) {
        Some(v) => v.trim().parse::<f32>().map(Some).map_err(|_| {
            CompletionError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected f32",
            })
        }),
        None => Ok(None),
    }
}

/// Validates that a floating-point value lies within an inclusive range.
///
/// # Errors
/// Returns [`ConfigError::OutOfRange`] if `value` is outside `[min, max]`.
pub fn validate_range_f32(field: &'static str, value: f32, min: f32, max: f32) -> Result<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            detail: "expected value in inclusive range",
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_is_trimmed_and_capped() {
        assert_eq!(make_snippet("  short body \n"), "short body");

        let long = "é".repeat(500);
        let s = make_snippet(&long);
        assert!(s.ends_with('…'));
        assert_eq!(s.chars().count(), 241);
    }

    #[test]
    fn temperature_range_is_inclusive() {
        assert!(validate_range_f32("temperature", 0.0, 0.0, 2.0).is_ok());
        assert!(validate_range_f32("temperature", 2.0, 0.0, 2.0).is_ok());
        assert!(validate_range_f32("temperature", 2.1, 0.0, 2.0).is_err());
        assert!(validate_range_f32("temperature", f32::NAN, 0.0, 2.0).is_err());
    }

    #[test]
    fn codes_are_stable() {
        let err: CompletionError = ProviderError::new(ProviderErrorKind::MissingApiKey).into();
        assert_eq!(err.code(), "MISSING_API_KEY");
        assert!(err.to_string().contains("API key is not configured"));

        let err: CompletionError = ConfigError::EmptyModel.into();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }
}
