use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, error, instrument};

use crate::model::ScoringBackend;
use crate::service::{RerankRequest, RerankResponse};

use super::RERANK_BACKEND_HEADER;
use super::error::GatewayError;
use super::state::HandlerState;

#[instrument(skip_all, fields(num_documents = tracing::field::Empty))]
pub async fn rerank_handler<B>(
    State(state): State<HandlerState<B>>,
    Json(request): Json<RerankRequest>,
) -> Result<Response, GatewayError>
where
    B: ScoringBackend + 'static,
{
    tracing::Span::current().record("num_documents", request.documents.len());
    debug!(
        query_len = request.query.len(),
        top_n = ?request.top_n,
        "Processing rerank request"
    );

    let service = Arc::clone(&state.service);
    let response = tokio::task::spawn_blocking(move || service.rerank(&request))
        .await
        .map_err(|e| {
            error!(error = %e, "Rerank task failed to complete");
            GatewayError::InternalError(format!("rerank task failed: {}", e))
        })?
        .map_err(|e| {
            error!(error = %e, "Rerank request failed");
            GatewayError::from(e)
        })?;

    let mut headers = HeaderMap::new();
    if let Some(kind) = state.service.backend_kind() {
        headers.insert(RERANK_BACKEND_HEADER, HeaderValue::from_static(kind));
    }

    Ok((headers, Json::<RerankResponse>(response)).into_response())
}
