use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use completion_service::CompletionError;
use thiserror::Error;

use crate::core::http::response_envelope::ErrorReply;

/// Text returned to callers for every upstream failure. Details stay in the logs.
pub const COMPLETION_FAILED: &str = "Failed to fetch completion";

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error("invalid configuration: {0}")]
    Config(#[source] CompletionError),

    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request / upstream ---
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("{}", COMPLETION_FAILED)]
    Upstream(#[source] CompletionError),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::Bind(_)
            | AppError::Server(_)
            | AppError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Upstream(e) => e.code(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        ErrorReply::new(self.error_code(), self.to_string()).into_response_with_status(status)
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Convert JSON body rejections to `AppError`.
impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(err: axum::extract::rejection::JsonRejection) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use completion_service::error_handler::{ProviderError, ProviderErrorKind};

    #[test]
    fn upstream_errors_hide_details() {
        let err = AppError::Upstream(ProviderError::new(ProviderErrorKind::MissingApiKey).into());
        assert_eq!(err.to_string(), COMPLETION_FAILED);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), "MISSING_API_KEY");
    }

    #[test]
    fn bad_request_is_400() {
        let err = AppError::BadRequest("missing field `prompt`".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("prompt"));
    }
}
