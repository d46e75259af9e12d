//! POST /api/chat: completion proxy.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::{error, info, instrument};

use crate::{
    core::{app_state::AppState, http::response_envelope::CompletionReply},
    error_handler::{AppError, AppResult},
    routes::completion::completion_request::CompletionRequest,
};

/// Handler: POST /api/chat
///
/// Attaches the server-side credential, forwards the prompt once, and returns
/// the first choice's text. Every upstream failure collapses into a 500 with
/// the generic `Failed to fetch completion` payload.
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8080/api/chat \
///   -H 'content-type: application/json' \
///   -d '{"prompt":"Summarize the termination clause."}'
/// ```
#[instrument(name = "completion_route", skip_all)]
pub async fn completion_route(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CompletionRequest>, JsonRejection>,
) -> AppResult<Json<CompletionReply>> {
    let Json(body) = payload?;

    let message = state
        .completion
        .complete(&body.prompt)
        .await
        .map_err(|e| {
            error!(code = e.code(), error = %e, "Error fetching completion");
            AppError::Upstream(e)
        })?;

    info!(
        prompt_len = body.prompt.len(),
        answer_len = message.len(),
        "completion proxied"
    );

    Ok(Json(CompletionReply { message }))
}
