use serde::{Deserialize, Serialize};

use crate::ranking::ScoredResult;

/// Body of `POST /rerank`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankRequest {
    pub query: String,
    pub documents: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_n: Option<usize>,
}

impl RerankRequest {
    pub fn new<D, S>(query: impl Into<String>, documents: D) -> Self
    where
        D: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            query: query.into(),
            documents: documents.into_iter().map(Into::into).collect(),
            top_n: None,
        }
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = Some(top_n);
        self
    }
}

/// Ranked documents, best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankResponse {
    pub results: Vec<ScoredResult>,
}
