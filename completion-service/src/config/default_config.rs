//! Completion config loaded from environment variables.
//!
//! # Environment variables
//!
//! - `OPENAI_API_KEY`      = bearer credential (optional; missing → every call fails)
//! - `OPENAI_URL`          = API base URL (default `https://api.openai.com`)
//! - `OPENAI_MODEL`        = model name (default `gpt-4o`)
//! - `OPENAI_MAX_TOKENS`   = max tokens (u32, default 100)
//! - `OPENAI_TEMPERATURE`  = temperature (f32 in `0.0..=2.0`, default 0.7)
//! - `OPENAI_TIMEOUT_SECS` = request timeout (u64, optional)

use crate::{
    config::completion_config::CompletionConfig,
    error_handler::{
        ConfigError, Result, env_opt, env_opt_f32, env_opt_u32, env_opt_u64, validate_range_f32,
    },
};

/// Builds a [`CompletionConfig`] from the environment, falling back to defaults.
///
/// A missing `OPENAI_API_KEY` is not an error here: the proxy still starts and
/// reports a failure per request.
///
/// # Errors
///
/// - [`ConfigError::InvalidNumber`] if a numeric variable does not parse
/// - [`ConfigError::OutOfRange`] if the temperature is outside `0.0..=2.0`
/// - [`ConfigError::EmptyModel`] if `OPENAI_MODEL` is set to whitespace
pub fn config_openai_from_env() -> Result<CompletionConfig> {
    let defaults = CompletionConfig::default();

    let model = match std::env::var("OPENAI_MODEL") {
        Ok(m) if m.trim().is_empty() => return Err(ConfigError::EmptyModel.into()),
        Ok(m) => m.trim().to_string(),
        Err(_) => defaults.model,
    };

    let temperature = env_opt_f32("OPENAI_TEMPERATURE")?.or(defaults.temperature);
    if let Some(t) = temperature {
        validate_range_f32("temperature", t, 0.0, 2.0)?;
    }

    Ok(CompletionConfig {
        model,
        endpoint: env_opt("OPENAI_URL").unwrap_or(defaults.endpoint),
        api_key: env_opt("OPENAI_API_KEY"),
        max_tokens: env_opt_u32("OPENAI_MAX_TOKENS")?.or(defaults.max_tokens),
        temperature,
        timeout_secs: env_opt_u64("OPENAI_TIMEOUT_SECS")?,
    })
}
