use super::error::BackendError;

/// Relevance score for one document of a batch, as produced by a backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackendScore {
    /// Position of the document within the batch passed to [`ScoringBackend::score`].
    pub index: usize,
    /// Raw relevance score. May be NaN; the merger normalizes it.
    pub score: f32,
}

impl BackendScore {
    pub fn new(index: usize, score: f32) -> Self {
        Self { index, score }
    }
}

/// A loaded scoring model.
///
/// Implementations map `(query, documents)` to exactly one [`BackendScore`] per
/// document, in any order. Memory pressure must be reported as
/// [`BackendError::ResourceExhausted`] so callers can shrink the batch.
pub trait ScoringBackend: Send + Sync {
    fn score(&self, query: &str, documents: &[&str]) -> Result<Vec<BackendScore>, BackendError>;

    /// Releases transient device-side caches between batches. No semantic effect.
    fn release_cache(&self) -> Result<(), BackendError> {
        Ok(())
    }

    /// Short label reported by the readiness endpoint.
    fn kind(&self) -> &'static str {
        "custom"
    }
}

impl<T: ScoringBackend + ?Sized> ScoringBackend for std::sync::Arc<T> {
    fn score(&self, query: &str, documents: &[&str]) -> Result<Vec<BackendScore>, BackendError> {
        (**self).score(query, documents)
    }

    fn release_cache(&self) -> Result<(), BackendError> {
        (**self).release_cache()
    }

    fn kind(&self) -> &'static str {
        (**self).kind()
    }
}
