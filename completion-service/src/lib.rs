//! Upstream completion client used by the proxy route.
//!
//! - [`config`]: [`CompletionConfig`] and its environment loader.
//! - [`services::open_ai_service`]: the `/v1/completions` client.
//! - [`error_handler`]: unified errors and env helpers.
//! - [`telemetry`]: tracing layer shared by the workspace binaries.

pub mod config {
    pub mod completion_config;
    pub mod default_config;
}

pub mod services {
    pub mod open_ai_service;
}

pub mod error_handler;
pub mod telemetry;

pub use config::completion_config::CompletionConfig;
pub use config::default_config::config_openai_from_env;
pub use error_handler::{CompletionError, Result};
pub use services::open_ai_service::OpenAiService;
