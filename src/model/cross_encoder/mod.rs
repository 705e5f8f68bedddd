pub mod config;


pub use config::CrossEncoderConfig;

use std::collections::HashSet;

use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use crate::config::{ModelSource, REQUIRED_MODEL_FILES};
use crate::model::backend::{BackendScore, ScoringBackend};
use crate::model::bert::BertClassifier;
use crate::model::device::{release_device_cache, select_device};
use crate::model::error::BackendError;
use crate::model::utils::{fetch_hub_model, load_pair_tokenizer};

enum EncoderBackend {
    Model {
        model: BertClassifier,
        tokenizer: Tokenizer,
        device: Device,
    },
    Stub {
        device: Device,
    },
}

/// Cross-encoder scoring backend (supports stub mode).
pub struct CrossEncoder {
    backend: EncoderBackend,
    config: CrossEncoderConfig,
}

impl std::fmt::Debug for CrossEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossEncoder")
            .field(
                "backend",
                &match &self.backend {
                    EncoderBackend::Model { device, .. } => format!("Model({:?})", device),
                    EncoderBackend::Stub { device } => format!("Stub({:?})", device),
                },
            )
            .field("config", &self.config)
            .finish()
    }
}

impl CrossEncoder {
    pub fn load(config: CrossEncoderConfig) -> Result<Self, BackendError> {
        if let Err(reason) = config.validate() {
            return Err(BackendError::InvalidConfig { reason });
        }

        let device = select_device()?;
        debug!(?device, "Selected compute device for cross-encoder");

        let model_dir = match &config.source {
            ModelSource::Stub => {
                warn!("Stub scorer requested, serving lexical placeholder scores");
                return Ok(Self {
                    backend: EncoderBackend::Stub { device },
                    config,
                });
            }
            ModelSource::Local(path) => path.clone(),
            ModelSource::Hub(model_id) => {
                info!(model_id = %model_id, "Fetching cross-encoder from Hugging Face Hub");
                fetch_hub_model(model_id)?
            }
        };

        for file in REQUIRED_MODEL_FILES {
            if !model_dir.join(file).exists() {
                return Err(BackendError::ModelLoadFailed {
                    reason: format!("Missing {} in {}", file, model_dir.display()),
                });
            }
        }

        info!(
            model_dir = %model_dir.display(),
            max_seq_len = config.max_seq_len,
            "Loading cross-encoder model"
        );

        let model = BertClassifier::load(&model_dir, &device).map_err(|e| {
            BackendError::ModelLoadFailed {
                reason: format!("Failed to load BERT model: {}", e),
            }
        })?;

        let tokenizer = load_pair_tokenizer(&model_dir, config.max_seq_len).map_err(|e| {
            BackendError::ModelLoadFailed {
                reason: format!("Failed to load tokenizer: {}", e),
            }
        })?;

        info!("Cross-encoder model loaded successfully");

        Ok(Self {
            backend: EncoderBackend::Model {
                model,
                tokenizer,
                device,
            },
            config,
        })
    }

    pub fn stub() -> Result<Self, BackendError> {
        Self::load(CrossEncoderConfig::stub())
    }

    pub fn is_model_loaded(&self) -> bool {
        matches!(self.backend, EncoderBackend::Model { .. })
    }

    pub fn config(&self) -> &CrossEncoderConfig {
        &self.config
    }

    pub fn device(&self) -> &Device {
        match &self.backend {
            EncoderBackend::Model { device, .. } | EncoderBackend::Stub { device } => device,
        }
    }

    fn score_with_model(
        &self,
        query: &str,
        documents: &[&str],
        model: &BertClassifier,
        tokenizer: &Tokenizer,
        device: &Device,
    ) -> Result<Vec<f32>, BackendError> {
        let pairs: Vec<(&str, &str)> = documents.iter().map(|doc| (query, *doc)).collect();
        let encodings =
            tokenizer
                .encode_batch(pairs, true)
                .map_err(|e| BackendError::TokenizationFailed {
                    reason: e.to_string(),
                })?;

        let batch = encodings.len();
        let seq_len = encodings.first().map_or(0, |e| e.get_ids().len());

        let mut input_ids = Vec::with_capacity(batch * seq_len);
        let mut type_ids = Vec::with_capacity(batch * seq_len);
        let mut attention_mask = Vec::with_capacity(batch * seq_len);
        for encoding in &encodings {
            if encoding.get_ids().len() != seq_len {
                return Err(BackendError::TokenizationFailed {
                    reason: "tokenizer produced a ragged batch".to_string(),
                });
            }
            input_ids.extend_from_slice(encoding.get_ids());
            type_ids.extend_from_slice(encoding.get_type_ids());
            attention_mask.extend_from_slice(encoding.get_attention_mask());
        }

        debug!(batch, seq_len, "Running cross-encoder forward pass");

        let input_ids = Tensor::from_vec(input_ids, (batch, seq_len), device)?;
        let type_ids = Tensor::from_vec(type_ids, (batch, seq_len), device)?;
        let attention_mask = Tensor::from_vec(attention_mask, (batch, seq_len), device)?;

        let logits = model.forward(&input_ids, &type_ids, Some(&attention_mask))?;
        let scores = candle_nn::ops::sigmoid(&logits)?
            .flatten_all()?
            .to_vec1::<f32>()?;

        if scores.len() != batch {
            return Err(BackendError::InvalidOutput {
                reason: format!("expected {} logits, model produced {}", batch, scores.len()),
            });
        }

        Ok(scores)
    }
}

impl ScoringBackend for CrossEncoder {
    fn score(&self, query: &str, documents: &[&str]) -> Result<Vec<BackendScore>, BackendError> {
        debug!(
            query_len = query.len(),
            num_documents = documents.len(),
            model_loaded = self.is_model_loaded(),
            "Scoring batch"
        );

        if documents.is_empty() {
            return Ok(vec![]);
        }

        let scores = match &self.backend {
            EncoderBackend::Model {
                model,
                tokenizer,
                device,
            } => self.score_with_model(query, documents, model, tokenizer, device)?,
            EncoderBackend::Stub { .. } => documents
                .iter()
                .map(|doc| lexical_score(query, doc))
                .collect(),
        };

        Ok(scores
            .into_iter()
            .enumerate()
            .map(|(index, score)| BackendScore::new(index, score))
            .collect())
    }

    fn release_cache(&self) -> Result<(), BackendError> {
        release_device_cache(self.device())
    }

    fn kind(&self) -> &'static str {
        if self.is_model_loaded() {
            "cross-encoder"
        } else {
            "stub"
        }
    }
}

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "could", "should", "may", "might", "must", "can", "to",
    "of", "in", "for", "on", "with", "at", "by", "from", "as", "into", "about", "then", "here",
    "there", "when", "where", "why", "how", "all", "each", "more", "most", "other", "some", "such",
    "no", "nor", "not", "only", "so", "than", "too", "very", "just", "and", "but", "if", "or",
    "what", "which", "who", "this", "that", "these", "those", "am", "it", "its",
];

fn content_words(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty() && !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Placeholder relevance in `[0, 1]` from query-term recall and Jaccard overlap.
pub(crate) fn lexical_score(query: &str, document: &str) -> f32 {
    let query_words = content_words(query);
    let document_words = content_words(document);

    if query_words.is_empty() {
        let len_ratio = (query.len().min(document.len()) as f32)
            / (query.len().max(document.len()).max(1) as f32);
        return len_ratio * 0.3;
    }

    let matches = query_words.intersection(&document_words).count();
    let recall = matches as f32 / query_words.len() as f32;

    let union = query_words.union(&document_words).count();
    let jaccard = if union > 0 {
        matches as f32 / union as f32
    } else {
        0.0
    };

    let base_score = 0.6 * recall + 0.4 * jaccard;

    let normalized = 1.0 / (1.0 + (-8.0 * (base_score - 0.5)).exp());

    normalized.clamp(0.0, 1.0)
}
