//! Rerank library crate (used by the server and integration tests).
//!
//! # Public API Surface
//!
//! ## Core Types
//! - [`Config`], [`ConfigError`] - Server configuration
//! - [`RerankService`], [`RerankRequest`], [`RerankResponse`] - Request entry point
//!
//! ## Scoring
//! - [`ScoringBackend`] - The capability the batch executor drives
//! - [`CrossEncoder`], [`CrossEncoderConfig`] - Candle cross-encoder (or stub)
//! - [`BackendSlot`] - Late-bound backend shared with the HTTP layer
//!
//! ## Batching & Ranking
//! - [`partition`], [`BatchExecutor`] - Batched inference with OOM back-off
//! - [`merge_results`], [`ScoredResult`] - Global ordering and truncation
//!
//! ## Test/Mock Support
//! [`MockBackend`] is available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod batching;
pub mod config;
pub mod constants;
pub mod gateway;
pub mod model;
pub mod ranking;
pub mod service;

pub use batching::{Batch, Batches, BatchExecutor, ExecutionOutcome, RerankError, partition};
pub use config::{Config, ConfigError, ModelSource};
pub use constants::{DEFAULT_BATCH_SIZE, DEFAULT_MAX_SEQ_LEN, DEFAULT_PORT};
pub use gateway::{GatewayError, HandlerState, create_router_with_state};
#[cfg(any(test, feature = "mock"))]
pub use model::{MockBackend, MockBehavior, MockCall};
pub use model::{
    BackendError, BackendScore, BackendSlot, CrossEncoder, CrossEncoderConfig, ScoringBackend,
};
pub use ranking::{ScoredResult, merge_results};
pub use service::{RerankRequest, RerankResponse, RerankService};
