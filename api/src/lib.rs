use std::{env, sync::Arc};

mod core {
    pub mod app_state;
    pub mod http {
        pub mod response_envelope;
    }
}
mod error_handler;
mod middleware_layer {
    pub mod json_extractor;
}
mod routes {
    pub mod completion {
        pub mod completion_request;
        pub mod completion_route;
    }
    pub mod health_route;
}

use axum::{
    Router,
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use tokio::signal;
use tracing::{error, info};

pub use crate::core::app_state::AppState;
pub use crate::error_handler::{AppError, AppResult, COMPLETION_FAILED};

use crate::{
    middleware_layer::json_extractor::json_error_mapper,
    routes::{completion::completion_route::completion_route, health_route::health},
};

/// Default bind address when `API_ADDRESS` is not set.
pub const DEFAULT_ADDRESS: &str = "127.0.0.1:8080";

/// Builds the HTTP router for the given state.
///
/// Routes:
/// - `POST /api/chat`: completion proxy
/// - `GET /health`: liveness probe
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/chat", post(completion_route))
        .route("/health", get(health))
        .fallback(not_found)
        .layer(middleware::from_fn(json_error_mapper))
        .with_state(state)
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "route not found")
}

/// Loads state from the environment, binds `API_ADDRESS` and serves until Ctrl+C.
pub async fn start() -> AppResult<()> {
    let host_url = env::var("API_ADDRESS").unwrap_or_else(|_| DEFAULT_ADDRESS.to_string());

    let state = Arc::new(AppState::from_env().map_err(AppError::Config)?);
    let app = router(state);

    // Bind to address
    let listener = tokio::net::TcpListener::bind(&host_url)
        .await
        .map_err(AppError::Bind)?;

    info!(address = %host_url, "completion proxy listening");

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("completion proxy stopped");
    Ok(())
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
