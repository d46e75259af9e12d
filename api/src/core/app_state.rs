use std::sync::Arc;

use completion_service::{CompletionConfig, CompletionError, OpenAiService, config_openai_from_env};

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Upstream completion client. Holds the credential; never exposed to callers.
    pub completion: Arc<OpenAiService>,
}

impl AppState {
    /// Builds state from an explicit completion config.
    pub fn new(cfg: CompletionConfig) -> Result<Self, CompletionError> {
        Ok(Self {
            completion: Arc::new(OpenAiService::new(cfg)?),
        })
    }

    /// Load shared state from environment variables (`OPENAI_*`).
    pub fn from_env() -> Result<Self, CompletionError> {
        Self::new(config_openai_from_env()?)
    }
}
