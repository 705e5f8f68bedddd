//! Scoring backends.
//!
//! - [`ScoringBackend`] is the capability the batch executor drives.
//! - [`cross_encoder`] is the candle implementation (with a lexical stub mode).
//! - [`BackendSlot`] holds the process-wide backend once it has loaded.

mod backend;
/// BERT-family sequence classifier used by the cross-encoder.
pub mod bert;
/// Cross-encoder scoring backend.
pub mod cross_encoder;
/// Device selection (CPU / Metal / CUDA) and cache release.
pub mod device;
mod error;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod slot;
/// Tokenizer and model download helpers.
pub mod utils;

pub use backend::{BackendScore, ScoringBackend};
pub use cross_encoder::{CrossEncoder, CrossEncoderConfig};
pub use error::BackendError;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockBackend, MockBehavior, MockCall};
pub use slot::BackendSlot;
