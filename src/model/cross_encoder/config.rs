use std::path::PathBuf;

use crate::config::{Config, ModelSource};
use crate::constants::DEFAULT_MAX_SEQ_LEN;

#[derive(Debug, Clone)]
pub struct CrossEncoderConfig {
    pub source: ModelSource,

    pub max_seq_len: usize,
}

impl Default for CrossEncoderConfig {
    fn default() -> Self {
        Self::stub()
    }
}

impl CrossEncoderConfig {
    pub fn new<P: Into<PathBuf>>(model_path: P) -> Self {
        Self {
            source: ModelSource::Local(model_path.into()),
            max_seq_len: DEFAULT_MAX_SEQ_LEN,
        }
    }

    pub fn hub(model_id: impl Into<String>) -> Self {
        Self {
            source: ModelSource::Hub(model_id.into()),
            max_seq_len: DEFAULT_MAX_SEQ_LEN,
        }
    }

    pub fn stub() -> Self {
        Self {
            source: ModelSource::Stub,
            max_seq_len: DEFAULT_MAX_SEQ_LEN,
        }
    }

    pub fn with_max_seq_len(mut self, max_seq_len: usize) -> Self {
        assert!(max_seq_len > 0, "max_seq_len must be positive");
        self.max_seq_len = max_seq_len;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_seq_len == 0 {
            return Err("max_seq_len must be positive".to_string());
        }

        match &self.source {
            ModelSource::Local(path) if path.as_os_str().is_empty() => {
                Err("model_path cannot be empty when provided".to_string())
            }
            ModelSource::Hub(id) if id.trim().is_empty() => {
                Err("model_id cannot be empty when provided".to_string())
            }
            _ => Ok(()),
        }
    }

    pub fn is_stub(&self) -> bool {
        self.source == ModelSource::Stub
    }
}

impl From<&Config> for CrossEncoderConfig {
    fn from(config: &Config) -> Self {
        Self {
            source: config.model_source(),
            max_seq_len: config.max_seq_len,
        }
    }
}
