//! Cross-cutting, shared constants.

/// Initial documents per backend call when `RERANK_BATCH_SIZE` is not set.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Tokenizer truncation length for query/document pairs.
pub const DEFAULT_MAX_SEQ_LEN: usize = 512;

/// Decimal places kept in `relevance_score` on the way out.
pub const SCORE_DECIMALS: i32 = 6;

/// Score emitted in place of NaN or infinite backend output.
pub const NON_FINITE_SCORE: f64 = 0.0;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8080;

/// Request body cap for `POST /rerank` when `RERANK_PAYLOAD_LIMIT` is not set.
pub const DEFAULT_PAYLOAD_LIMIT: usize = 64 * 1024 * 1024;

/// Hugging Face Hub cross-encoder loaded when no local model is configured.
pub const DEFAULT_MODEL_ID: &str = "BAAI/bge-reranker-base";
