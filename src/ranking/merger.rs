use std::cmp::Ordering;

use tracing::debug;

use crate::constants::{NON_FINITE_SCORE, SCORE_DECIMALS};

use super::types::ScoredResult;

/// Orders by score descending, then by ascending original index.
pub fn compare_by_relevance(a: &ScoredResult, b: &ScoredResult) -> Ordering {
    b.relevance_score
        .total_cmp(&a.relevance_score)
        .then_with(|| a.index.cmp(&b.index))
}

/// Maps NaN and infinities to [`NON_FINITE_SCORE`].
pub fn normalize_score(score: f64) -> f64 {
    if score.is_finite() {
        score
    } else {
        NON_FINITE_SCORE
    }
}

/// Rounds to [`SCORE_DECIMALS`] places.
pub fn round_score(score: f64) -> f64 {
    let factor = 10f64.powi(SCORE_DECIMALS);
    let rounded = (score * factor).round() / factor;
    if rounded.is_finite() { rounded } else { score }
}

/// Builds the final ranking from the unsorted per-batch results of one request.
pub fn merge_results(mut results: Vec<ScoredResult>, top_n: Option<usize>) -> Vec<ScoredResult> {
    let scored = results.len();

    for result in &mut results {
        result.relevance_score = normalize_score(result.relevance_score);
    }

    results.sort_by(compare_by_relevance);

    if let Some(top_n) = top_n {
        results.truncate(top_n);
    }

    for result in &mut results {
        result.relevance_score = round_score(result.relevance_score);
    }

    debug!(
        scored,
        returned = results.len(),
        top_score = results.first().map(|r| r.relevance_score),
        "Merged batch results"
    );

    results
}
