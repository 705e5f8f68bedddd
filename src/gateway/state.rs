use std::sync::Arc;

use crate::constants::DEFAULT_PAYLOAD_LIMIT;
use crate::model::ScoringBackend;
use crate::service::RerankService;

pub struct HandlerState<B: ScoringBackend + 'static> {
    pub service: Arc<RerankService<B>>,
    /// Body cap for `POST /rerank`, in bytes.
    pub payload_limit: usize,
}

impl<B: ScoringBackend + 'static> Clone for HandlerState<B> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            payload_limit: self.payload_limit,
        }
    }
}

impl<B: ScoringBackend + 'static> HandlerState<B> {
    pub fn new(service: Arc<RerankService<B>>) -> Self {
        Self {
            service,
            payload_limit: DEFAULT_PAYLOAD_LIMIT,
        }
    }

    pub fn with_payload_limit(mut self, payload_limit: usize) -> Self {
        self.payload_limit = payload_limit;
        self
    }
}
