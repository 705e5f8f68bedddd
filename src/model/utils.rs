use std::io;
use std::path::{Path, PathBuf};
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

use crate::config::REQUIRED_MODEL_FILES;

use super::error::BackendError;

/// Loads `tokenizer.json` from a model directory with truncation and
/// batch-longest padding, so a batch of pairs encodes to one rectangular tensor.
pub fn load_pair_tokenizer(model_dir: &Path, max_len: usize) -> io::Result<Tokenizer> {
    let mut tokenizer =
        Tokenizer::from_file(model_dir.join("tokenizer.json")).map_err(io::Error::other)?;

    let truncation = TruncationParams {
        max_length: max_len,
        ..Default::default()
    };

    tokenizer
        .with_truncation(Some(truncation))
        .map_err(|e| io::Error::other(format!("Failed to configure truncation: {}", e)))?;

    let padding = match tokenizer.get_padding() {
        Some(existing) => PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..existing.clone()
        },
        None => PaddingParams::default(),
    };
    tokenizer.with_padding(Some(padding));

    Ok(tokenizer)
}

/// Downloads (or reuses the local hub cache of) a cross-encoder repository and
/// returns the snapshot directory holding its files.
pub fn fetch_hub_model(model_id: &str) -> Result<PathBuf, BackendError> {
    let api = hf_hub::api::sync::Api::new()?;
    let repo = api.model(model_id.to_string());

    let mut snapshot_dir: Option<PathBuf> = None;
    for file in REQUIRED_MODEL_FILES {
        let path = repo.get(file)?;
        if snapshot_dir.is_none() {
            snapshot_dir = path.parent().map(Path::to_path_buf);
        }
    }

    snapshot_dir.ok_or_else(|| BackendError::ModelLoadFailed {
        reason: format!("hub cache for {} has no snapshot directory", model_id),
    })
}
