use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::debug;

use crate::core::http::response_envelope::ErrorReply;

const REQUEST_ID: &str = "X-Request-Id";

async fn take_body(res: Response) -> (axum::http::response::Parts, Bytes) {
    let (parts, body) = res.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();
    (parts, bytes)
}

fn incoming_request_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REQUEST_ID)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn new_request_id() -> String {
    let nanos = Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_else(|| Utc::now().timestamp_micros() * 1000);
    format!("req-{nanos}")
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

fn code_for(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "BAD_REQUEST",
        StatusCode::NOT_FOUND => "NOT_FOUND",
        StatusCode::METHOD_NOT_ALLOWED => "METHOD_NOT_ALLOWED",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "UNSUPPORTED_MEDIA_TYPE",
        StatusCode::UNPROCESSABLE_ENTITY => "UNPROCESSABLE_ENTITY",
        _ => "CLIENT_ERROR",
    }
}

/// Tags every response with `X-Request-Id` and rewrites plain-text 4xx bodies
/// (axum rejections, unknown routes) into the JSON `{ error, code }` shape.
pub async fn json_error_mapper(req: Request<Body>, next: Next) -> Response {
    let req_id = incoming_request_id(req.headers()).unwrap_or_else(new_request_id);

    let res = next.run(req).await;
    let status = res.status();

    let mut res = if status.is_client_error() && !is_json(res.headers()) {
        let (mut parts, bytes) = take_body(res).await;
        let original = String::from_utf8_lossy(&bytes);
        let message = match original.trim() {
            "" => status.canonical_reason().unwrap_or("client error").to_string(),
            text => text.to_string(),
        };
        debug!(%status, %req_id, %message, "rewriting client error body as JSON");

        let body = serde_json::to_vec(&ErrorReply::new(code_for(status), message))
            .unwrap_or_else(|_| bytes.to_vec());

        parts.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        parts.headers.remove(header::CONTENT_LENGTH);
        Response::from_parts(parts, body.into())
    } else {
        res
    };

    if let Ok(v) = HeaderValue::from_str(&req_id) {
        res.headers_mut().insert(REQUEST_ID, v);
    }
    res
}
