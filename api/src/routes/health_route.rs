use axum::Json;
use serde_json::{Value, json};

/// Handler: GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
