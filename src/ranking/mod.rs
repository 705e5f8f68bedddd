//! Global ranking of per-batch results.
//!
//! [`merge_results`] is applied once per request, after every batch has been
//! scored: it normalizes non-finite scores, sorts descending with an index
//! tiebreak, truncates to `top_n` and rounds for output.

pub mod merger;
pub mod types;


pub use merger::{compare_by_relevance, merge_results, normalize_score, round_score};
pub use types::ScoredResult;
