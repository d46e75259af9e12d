use std::{net::SocketAddr, sync::Arc};

use api::{AppState, COMPLETION_FAILED, router};
use axum::{Json, Router, http::StatusCode, routing::post};
use completion_service::CompletionConfig;
use serde_json::{Value, json};

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Starts the proxy in front of `upstream` and returns the proxy base URL.
async fn spawn_proxy(upstream: String, api_key: Option<&str>) -> String {
    let state = AppState::new(CompletionConfig {
        endpoint: upstream,
        api_key: api_key.map(str::to_string),
        ..CompletionConfig::default()
    })
    .unwrap();
    spawn(router(Arc::new(state))).await
}

async fn post_prompt(base: &str, body: Value) -> (StatusCode, Value, Option<String>) {
    let resp = reqwest::Client::new()
        .post(format!("{base}/api/chat"))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = StatusCode::from_u16(resp.status().as_u16()).unwrap();
    let req_id = resp
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    (status, resp.json().await.unwrap(), req_id)
}

#[tokio::test]
async fn forwards_prompt_and_returns_message() {
    let upstream = spawn(Router::new().route(
        "/v1/completions",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body["model"], "gpt-4o");
            assert_eq!(body["max_tokens"], 100);
            Json(json!({ "choices": [ { "text": format!("\n{}!", body["prompt"].as_str().unwrap()) } ] }))
        }),
    ))
    .await;
    let proxy = spawn_proxy(upstream, Some("sk-test")).await;

    let (status, body, req_id) = post_prompt(&proxy, json!({ "prompt": "Hello" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Hello!" }));
    assert!(req_id.is_some_and(|id| id.starts_with("req-")));
}

#[tokio::test]
async fn missing_credential_returns_generic_failure() {
    // Upstream would succeed; the proxy must refuse before calling it.
    let upstream = spawn(Router::new().route(
        "/v1/completions",
        post(|| async { Json(json!({ "choices": [ { "text": "leak" } ] })) }),
    ))
    .await;
    let proxy = spawn_proxy(upstream, None).await;

    let (status, body, _) = post_prompt(&proxy, json!({ "prompt": "Hello" })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], COMPLETION_FAILED);
    assert_eq!(body["code"], "MISSING_API_KEY");
    assert!(body.get("message").is_none());
}

#[tokio::test]
async fn upstream_error_is_not_leaked() {
    let upstream = spawn(Router::new().route(
        "/v1/completions",
        post(|| async { (StatusCode::UNAUTHORIZED, "invalid key sk-secret") }),
    ))
    .await;
    let proxy = spawn_proxy(upstream, Some("sk-secret")).await;

    let (status, body, _) = post_prompt(&proxy, json!({ "prompt": "Hello" })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], COMPLETION_FAILED);
    assert!(!body.to_string().contains("sk-secret"));
}

#[tokio::test]
async fn malformed_payload_is_a_json_bad_request() {
    let proxy = spawn_proxy("http://127.0.0.1:9".into(), Some("sk-test")).await;

    let (status, body, _) = post_prompt(&proxy, json!({ "question": "wrong field" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(body["error"].as_str().unwrap().contains("prompt"));
}

#[tokio::test]
async fn unknown_route_gets_json_error_and_request_id_is_echoed() {
    let proxy = spawn_proxy("http://127.0.0.1:9".into(), None).await;

    let resp = reqwest::Client::new()
        .get(format!("{proxy}/nope"))
        .header("X-Request-Id", "trace-42")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 404);
    assert_eq!(resp.headers()["x-request-id"], "trace-42");
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn health_is_ok() {
    let proxy = spawn_proxy("http://127.0.0.1:9".into(), None).await;

    let body: Value = reqwest::get(format!("{proxy}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body, json!({ "status": "ok" }));
}
