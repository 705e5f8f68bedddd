use thiserror::Error;

use crate::model::BackendError;

/// Failures of one rerank request. No partial results accompany any of them.
#[derive(Debug, Error)]
pub enum RerankError {
    /// The backend has not finished loading. Not retried.
    #[error("scoring backend is not ready")]
    NotReady,

    /// Caller or configuration error (zero batch size, `top_n` of zero). Not retried.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// Memory exhaustion that shrinking the batch could not resolve.
    #[error("backend exhausted resources at batch size {batch_size}: {source}")]
    ResourceExhausted {
        batch_size: usize,
        #[source]
        source: BackendError,
    },

    /// Any other backend failure. Never retried.
    #[error("scoring backend failed: {0}")]
    Backend(#[from] BackendError),
}

impl RerankError {
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        RerankError::InvalidArgument {
            reason: reason.into(),
        }
    }
}
