use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::batching::RerankError;

use super::RERANK_STATUS_HEADER;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("service not ready: {0}")]
    NotReady(String),

    #[error("rerank failed: {0}")]
    RerankFailed(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl From<RerankError> for GatewayError {
    fn from(err: RerankError) -> Self {
        match err {
            RerankError::NotReady => GatewayError::NotReady(err.to_string()),
            RerankError::InvalidArgument { .. } => GatewayError::InvalidRequest(err.to_string()),
            RerankError::ResourceExhausted { .. } | RerankError::Backend(_) => {
                GatewayError::RerankFailed(err.to_string())
            }
        }
    }
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, rerank_status) = match &self {
            GatewayError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            GatewayError::NotReady(_) => (StatusCode::SERVICE_UNAVAILABLE, "not_ready"),
            GatewayError::RerankFailed(_) => (StatusCode::INTERNAL_SERVER_ERROR, "rerank_error"),
            GatewayError::InternalError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        let mut headers = HeaderMap::new();
        headers.insert(RERANK_STATUS_HEADER, HeaderValue::from_static(rerank_status));

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
