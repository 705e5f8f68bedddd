use thiserror::Error;

/// Failures surfaced by a [`ScoringBackend`](super::ScoringBackend).
///
/// [`BackendError::ResourceExhausted`] is the only kind the batch executor
/// retries (with a smaller batch). Everything else is fatal for the request.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend resource exhausted: {reason}")]
    ResourceExhausted { reason: String },

    #[error("failed to load scoring model: {reason}")]
    ModelLoadFailed { reason: String },

    #[error("{device} device unavailable: {reason}")]
    DeviceUnavailable { device: String, reason: String },

    #[error("inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("tokenization failed: {reason}")]
    TokenizationFailed { reason: String },

    #[error("invalid model configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("backend returned invalid output: {reason}")]
    InvalidOutput { reason: String },
}

impl BackendError {
    /// Returns `true` for memory exhaustion (the retryable kind).
    pub fn is_resource_exhausted(&self) -> bool {
        matches!(self, BackendError::ResourceExhausted { .. })
    }
}

const OUT_OF_MEMORY_MARKERS: [&str; 3] = ["out of memory", "out_of_memory", "outofmemory"];

/// Whether a candle error (or anything in its source chain) is an allocator failure.
///
/// Candle has no dedicated variant for device OOM; CUDA and Metal report it
/// through their driver errors. This is the only place that inspects error text.
pub(crate) fn is_out_of_memory(err: &candle_core::Error) -> bool {
    let mut current: Option<&dyn std::error::Error> = Some(err);
    while let Some(e) = current {
        let text = e.to_string().to_lowercase();
        if OUT_OF_MEMORY_MARKERS.iter().any(|m| text.contains(m)) {
            return true;
        }
        current = e.source();
    }
    false
}

impl From<candle_core::Error> for BackendError {
    fn from(err: candle_core::Error) -> Self {
        if is_out_of_memory(&err) {
            BackendError::ResourceExhausted {
                reason: err.to_string(),
            }
        } else {
            BackendError::InferenceFailed {
                reason: err.to_string(),
            }
        }
    }
}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        BackendError::ModelLoadFailed {
            reason: err.to_string(),
        }
    }
}

impl From<hf_hub::api::sync::ApiError> for BackendError {
    fn from(err: hf_hub::api::sync::ApiError) -> Self {
        BackendError::ModelLoadFailed {
            reason: format!("model download failed: {}", err),
        }
    }
}
