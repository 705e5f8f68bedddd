//! The rerank entry point used by the HTTP layer.
//!
//! [`RerankService::rerank`] validates the request, runs the
//! [`BatchExecutor`] and hands its results to [`merge_results`].

pub mod types;


pub use types::{RerankRequest, RerankResponse};

use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::batching::{BatchExecutor, RerankError};
use crate::model::{BackendSlot, ScoringBackend};
use crate::ranking::merge_results;

pub struct RerankService<B> {
    executor: BatchExecutor<B>,
}

impl<B> std::fmt::Debug for RerankService<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RerankService")
            .field("executor", &self.executor)
            .finish()
    }
}

impl<B: ScoringBackend> RerankService<B> {
    pub fn new(backend: Arc<BackendSlot<B>>, batch_size: usize) -> Result<Self, RerankError> {
        Ok(Self {
            executor: BatchExecutor::new(backend, batch_size)?,
        })
    }

    pub fn is_ready(&self) -> bool {
        self.executor.backend().is_ready()
    }

    /// Backend label for readiness reporting, once loaded.
    pub fn backend_kind(&self) -> Option<&'static str> {
        self.executor.backend().get().map(|backend| backend.kind())
    }

    pub fn batch_size(&self) -> usize {
        self.executor.initial_batch_size()
    }

    /// Ranks `request.documents` against `request.query`.
    ///
    /// Blocks while another request holds the backend. Either every document
    /// is scored or the request fails.
    pub fn rerank(&self, request: &RerankRequest) -> Result<RerankResponse, RerankError> {
        if request.top_n == Some(0) {
            return Err(RerankError::invalid_argument("top_n must be at least 1"));
        }

        if !self.is_ready() {
            return Err(RerankError::NotReady);
        }

        let started = Instant::now();
        let outcome = self.executor.execute(&request.query, &request.documents)?;
        let results = merge_results(outcome.results, request.top_n);

        info!(
            num_documents = request.documents.len(),
            returned = results.len(),
            batch_size = outcome.final_batch_size,
            attempts = outcome.attempts,
            batches = outcome.batches,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Rerank complete"
        );

        Ok(RerankResponse { results })
    }
}
