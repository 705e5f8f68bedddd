use serde::{Deserialize, Serialize};

/// One document with its relevance to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    /// Position of the document in the submitted list.
    pub index: usize,
    /// The document text, echoed back.
    pub document: String,
    /// Relevance score; finite and rounded once it has been through the merger.
    pub relevance_score: f64,
}

impl ScoredResult {
    pub fn new(index: usize, document: impl Into<String>, relevance_score: f64) -> Self {
        Self {
            index,
            document: document.into(),
            relevance_score,
        }
    }
}
