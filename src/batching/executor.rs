use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, warn};

use crate::model::{BackendError, BackendScore, BackendSlot, ScoringBackend};
use crate::ranking::ScoredResult;

use super::error::RerankError;
use super::partition::{Batch, partition};

/// Result of one successful execution.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOutcome {
    /// Exactly one entry per submitted document, in no particular order.
    pub results: Vec<ScoredResult>,
    /// Batch size of the pass that succeeded.
    pub final_batch_size: usize,
    /// Passes started, including the successful one.
    pub attempts: usize,
    /// Backend calls made by the successful pass.
    pub batches: usize,
}

/// Runs the backend over every batch of a request, shrinking the batch on
/// memory exhaustion.
///
/// One execution at a time: the guard is held for the whole request,
/// retries included, so batches of concurrent requests never interleave on
/// the backend.
pub struct BatchExecutor<B> {
    backend: Arc<BackendSlot<B>>,
    initial_batch_size: usize,
    guard: Mutex<()>,
}

impl<B> std::fmt::Debug for BatchExecutor<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchExecutor")
            .field("backend", &self.backend)
            .field("initial_batch_size", &self.initial_batch_size)
            .finish()
    }
}

impl<B: ScoringBackend> BatchExecutor<B> {
    pub fn new(
        backend: Arc<BackendSlot<B>>,
        initial_batch_size: usize,
    ) -> Result<Self, RerankError> {
        if initial_batch_size == 0 {
            return Err(RerankError::invalid_argument(
                "initial batch size must be at least 1",
            ));
        }

        Ok(Self {
            backend,
            initial_batch_size,
            guard: Mutex::new(()),
        })
    }

    pub fn initial_batch_size(&self) -> usize {
        self.initial_batch_size
    }

    pub fn backend(&self) -> &Arc<BackendSlot<B>> {
        &self.backend
    }

    /// Scores every document exactly once, or fails as a whole.
    pub fn execute(
        &self,
        query: &str,
        documents: &[String],
    ) -> Result<ExecutionOutcome, RerankError> {
        let backend = self.backend.get().ok_or(RerankError::NotReady)?;

        if documents.is_empty() {
            return Ok(ExecutionOutcome {
                results: Vec::new(),
                final_batch_size: self.initial_batch_size,
                attempts: 0,
                batches: 0,
            });
        }

        let _guard = self.guard.lock();

        let mut batch_size = self.initial_batch_size;
        let mut attempts = 0;

        loop {
            attempts += 1;

            match run_pass(backend, query, documents, batch_size) {
                Ok((results, batches)) => {
                    return Ok(ExecutionOutcome {
                        results,
                        final_batch_size: batch_size,
                        attempts,
                        batches,
                    });
                }
                Err(RerankError::Backend(source)) if source.is_resource_exhausted() => {
                    if batch_size == 1 {
                        error!(
                            attempts,
                            num_documents = documents.len(),
                            error = %source,
                            "Out of memory at batch size 1, giving up"
                        );
                        return Err(RerankError::ResourceExhausted { batch_size, source });
                    }

                    release_cache(backend);
                    let next = (batch_size / 2).max(1);
                    warn!(
                        batch_size,
                        next_batch_size = next,
                        error = %source,
                        "Out of memory, retrying with smaller batch"
                    );
                    batch_size = next;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// One full pass over the documents at a fixed batch size.
fn run_pass<B: ScoringBackend>(
    backend: &B,
    query: &str,
    documents: &[String],
    batch_size: usize,
) -> Result<(Vec<ScoredResult>, usize), RerankError> {
    let mut results = Vec::with_capacity(documents.len());
    let mut batches = 0;

    for batch in partition(documents, batch_size)? {
        let texts: Vec<&str> = batch.items.iter().map(String::as_str).collect();
        let scores = backend.score(query, &texts)?;
        rebase_scores(&batch, scores, &mut results)?;
        batches += 1;

        debug!(
            start = batch.start,
            len = batch.len(),
            batch_size,
            "Scored batch"
        );

        release_cache(backend);
    }

    Ok((results, batches))
}

/// Converts batch-local scores to absolute results, checking the backend
/// scored each document of the batch exactly once.
fn rebase_scores(
    batch: &Batch<'_, String>,
    scores: Vec<BackendScore>,
    out: &mut Vec<ScoredResult>,
) -> Result<(), BackendError> {
    if scores.len() != batch.len() {
        return Err(BackendError::InvalidOutput {
            reason: format!(
                "batch at {} has {} documents but backend returned {} scores",
                batch.start,
                batch.len(),
                scores.len()
            ),
        });
    }

    let mut seen = vec![false; batch.len()];
    for scored in scores {
        match seen.get_mut(scored.index) {
            Some(slot) if !*slot => *slot = true,
            Some(_) => {
                return Err(BackendError::InvalidOutput {
                    reason: format!("duplicate score for batch position {}", scored.index),
                });
            }
            None => {
                return Err(BackendError::InvalidOutput {
                    reason: format!(
                        "batch position {} out of range for batch of {}",
                        scored.index,
                        batch.len()
                    ),
                });
            }
        }

        out.push(ScoredResult::new(
            batch.absolute_index(scored.index),
            batch.items[scored.index].clone(),
            f64::from(scored.score),
        ));
    }

    Ok(())
}

fn release_cache<B: ScoringBackend>(backend: &B) {
    if let Err(e) = backend.release_cache() {
        warn!(error = %e, "Failed to release backend cache");
    }
}
