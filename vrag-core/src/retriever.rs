//! Vector retrieval of candidate chunks for one sub-question.

use std::sync::Arc;

use tracing::debug;

use crate::document::SearchResult;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::vectorstore::{SearchMode, VectorIndex};

/// Embeds a query and selects candidates from a [`VectorIndex`].
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    k: usize,
    mode: SearchMode,
}

impl std::fmt::Debug for Retriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever").field("k", &self.k).field("mode", &self.mode).finish_non_exhaustive()
    }
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>, k: usize, mode: SearchMode) -> Self {
        Self { embedder, k, mode }
    }

    /// Return up to `k` candidates for `query`.
    ///
    /// An empty index yields an empty `Vec` without embedding the query.
    pub async fn retrieve(&self, index: &dyn VectorIndex, query: &str) -> Result<Vec<SearchResult>> {
        if index.is_empty().await {
            debug!(query, "index is empty, nothing to retrieve");
            return Ok(Vec::new());
        }
        let query_vector = self.embedder.embed_query(query).await?;
        let results = index.similarity_search(&query_vector, self.k, self.mode).await?;
        debug!(query, result_count = results.len(), "retrieved candidates");
        Ok(results)
    }
}
