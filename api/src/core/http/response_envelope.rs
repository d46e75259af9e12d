use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Successful proxy reply: `{ "message": "..." }`.
#[derive(Debug, Serialize)]
pub struct CompletionReply {
    pub message: String,
}

/// Failure reply: `{ "error": "...", "code": "..." }`.
///
/// `error` is the human-facing text; `code` is stable and machine-readable.
#[derive(Debug, Serialize)]
pub struct ErrorReply {
    pub error: String,
    pub code: &'static str,
}

impl ErrorReply {
    pub fn new(code: &'static str, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }

    /// Convert to axum Response.
    pub fn into_response_with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}
