use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::backend::{BackendScore, ScoringBackend};
use super::error::BackendError;

/// How a [`MockBackend`] reacts to a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockBehavior {
    /// Always succeeds.
    Score,
    /// Reports memory exhaustion for any batch larger than the limit.
    ExhaustAbove(usize),
    /// Reports memory exhaustion for every batch.
    AlwaysExhaust,
    /// Fails with a non-exhaustion inference error.
    Fail(String),
}

/// One recorded backend invocation.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub query: String,
    pub batch_len: usize,
    pub started: Instant,
    pub finished: Instant,
}

/// Scripted scoring backend for tests.
///
/// A document that parses as a float (including `"NaN"`) scores as that value;
/// anything else gets a stable hash-derived score in `[0, 1)`. Results come
/// back sorted by score, not in input order, like most rerank models.
#[derive(Debug)]
pub struct MockBackend {
    behavior: MockBehavior,
    delay: Option<Duration>,
    calls: Mutex<Vec<MockCall>>,
    cache_releases: AtomicUsize,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self::with_behavior(MockBehavior::Score)
    }

    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            delay: None,
            calls: Mutex::new(Vec::new()),
            cache_releases: AtomicUsize::new(0),
        }
    }

    pub fn exhausting_above(limit: usize) -> Self {
        Self::with_behavior(MockBehavior::ExhaustAbove(limit))
    }

    pub fn always_exhausting() -> Self {
        Self::with_behavior(MockBehavior::AlwaysExhaust)
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self::with_behavior(MockBehavior::Fail(reason.into()))
    }

    /// Sleeps inside every call, to widen windows in concurrency tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Sizes of every batch the backend was asked to score, in call order.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.calls.lock().iter().map(|c| c.batch_len).collect()
    }

    pub fn cache_releases(&self) -> usize {
        self.cache_releases.load(Ordering::SeqCst)
    }

    pub fn document_score(document: &str) -> f32 {
        if let Ok(score) = document.trim().parse::<f32>() {
            return score;
        }
        let mut hasher = DefaultHasher::new();
        document.hash(&mut hasher);
        (hasher.finish() % 10_000) as f32 / 10_000.0
    }

    fn outcome(&self, documents: &[&str]) -> Result<Vec<BackendScore>, BackendError> {
        match &self.behavior {
            MockBehavior::ExhaustAbove(limit) if documents.len() > *limit => {
                Err(BackendError::ResourceExhausted {
                    reason: format!("mock: batch of {} exceeds {}", documents.len(), limit),
                })
            }
            MockBehavior::AlwaysExhaust => Err(BackendError::ResourceExhausted {
                reason: "mock: device out of memory".to_string(),
            }),
            MockBehavior::Fail(reason) => Err(BackendError::InferenceFailed {
                reason: reason.clone(),
            }),
            _ => {
                let mut scores: Vec<BackendScore> = documents
                    .iter()
                    .enumerate()
                    .map(|(index, doc)| BackendScore::new(index, Self::document_score(doc)))
                    .collect();
                scores.sort_by(|a, b| b.score.total_cmp(&a.score));
                Ok(scores)
            }
        }
    }
}

impl ScoringBackend for MockBackend {
    fn score(&self, query: &str, documents: &[&str]) -> Result<Vec<BackendScore>, BackendError> {
        let started = Instant::now();
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        let outcome = self.outcome(documents);

        self.calls.lock().push(MockCall {
            query: query.to_string(),
            batch_len: documents.len(),
            started,
            finished: Instant::now(),
        });

        outcome
    }

    fn release_cache(&self) -> Result<(), BackendError> {
        self.cache_releases.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "mock"
    }
}
