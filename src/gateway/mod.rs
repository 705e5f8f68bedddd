//! HTTP gateway (Axum) for the rerank service.
//!
//! This module is primarily used by the `rerank` server binary.

pub mod error;
pub mod handler;
pub mod state;


use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use error::{ErrorResponse, GatewayError};
pub use handler::rerank_handler;
pub use state::HandlerState;

use crate::model::ScoringBackend;

/// Response header carrying a short machine-readable outcome.
pub const RERANK_STATUS_HEADER: &str = "x-rerank-status";
/// Response header on `POST /rerank` naming the backend that scored it.
pub const RERANK_BACKEND_HEADER: &str = "x-rerank-backend";
pub const RERANK_STATUS_HEALTHY: &str = "healthy";
pub const RERANK_STATUS_READY: &str = "ready";
pub const RERANK_STATUS_LOADING: &str = "loading";

pub fn create_router_with_state<B>(state: HandlerState<B>) -> Router
where
    B: ScoringBackend + 'static,
{
    let payload_limit = state.payload_limit;

    Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler::<B>))
        .route("/rerank", post(rerank_handler::<B>))
        .layer(DefaultBodyLimit::max(payload_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub backend: &'static str,
    pub batch_size: usize,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        RERANK_STATUS_HEADER,
        HeaderValue::from_static(RERANK_STATUS_HEALTHY),
    );

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler<B>(State(state): State<HandlerState<B>>) -> Response
where
    B: ScoringBackend + 'static,
{
    let backend = state.service.backend_kind();
    let (status_code, status_msg, header) = match backend {
        Some(_) => (StatusCode::OK, "ok", RERANK_STATUS_READY),
        None => (StatusCode::SERVICE_UNAVAILABLE, "loading", RERANK_STATUS_LOADING),
    };

    let mut headers = HeaderMap::new();
    headers.insert(RERANK_STATUS_HEADER, HeaderValue::from_static(header));

    (
        status_code,
        headers,
        Json(ReadyResponse {
            status: status_msg,
            backend: backend.unwrap_or("pending"),
            batch_size: state.service.batch_size(),
        }),
    )
        .into_response()
}
