//! Batched inference over a shared scoring backend.
//!
//! [`partition`] splits a request's documents into contiguous batches, and
//! [`BatchExecutor`] drives the backend across them:
//!
//! - one request at a time per executor (the backend owns device memory);
//! - on [`BackendError::ResourceExhausted`](crate::model::BackendError) the
//!   batch size is halved and the whole pass restarts, partial results
//!   discarded;
//! - exhaustion at batch size 1, or any other failure, fails the request.

pub mod error;
pub mod executor;
pub mod partition;


pub use error::RerankError;
pub use executor::{BatchExecutor, ExecutionOutcome};
pub use partition::{Batch, Batches, partition};
