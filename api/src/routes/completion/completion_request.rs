use serde::Deserialize;

/// Request payload for `POST /api/chat`.
#[derive(Debug, Deserialize)]
pub struct CompletionRequest {
    /// Prompt forwarded verbatim to the upstream completion API.
    pub prompt: String,
}
