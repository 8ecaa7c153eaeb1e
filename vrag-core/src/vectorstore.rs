//! Vector index trait for storing and searching chunk embeddings.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::document::{Chunk, SearchResult};
use crate::error::Result;

/// How candidates are selected from the index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// The `k` entries most similar to the query.
    Similarity,
    /// Maximal marginal relevance over the `fetch_k` most similar entries.
    ///
    /// `lambda` trades relevance (1.0) against diversity (0.0).
    Mmr { fetch_k: usize, lambda: f32 },
}

impl Default for SearchMode {
    fn default() -> Self {
        Self::Mmr { fetch_k: 20, lambda: 0.5 }
    }
}

/// A storage backend for chunk embeddings with similarity search.
///
/// One instance holds one index build. A rebuild produces a new instance, so
/// there is no upsert or delete: readers of an instance always see the same
/// set of chunks once it has been published.
///
/// # Example
///
/// ```rust,ignore
/// use vrag_core::{InMemoryVectorIndex, SearchMode, VectorIndex};
///
/// let index = InMemoryVectorIndex::new();
/// index.add(chunks, vectors).await?;
/// let hits = index.similarity_search(&query_vector, 10, SearchMode::Similarity).await?;
/// ```
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Add chunks with their embeddings, pairwise by position.
    ///
    /// Fails with [`RagError::DuplicateChunk`](crate::RagError::DuplicateChunk)
    /// if a `source_id` is already present, leaving the index unchanged.
    async fn add(&self, chunks: Vec<Chunk>, vectors: Vec<Vec<f32>>) -> Result<()>;

    /// Return up to `k` entries for the query vector, selected by `mode`.
    ///
    /// Results carry the cosine similarity to the query. An empty index
    /// yields an empty `Vec`.
    async fn similarity_search(
        &self,
        query_vector: &[f32],
        k: usize,
        mode: SearchMode,
    ) -> Result<Vec<SearchResult>>;

    /// Number of indexed chunks.
    async fn len(&self) -> usize;

    /// Whether the index holds no chunks.
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Write the index below the `location` directory.
    async fn persist(&self, location: &Path) -> Result<()>;

    /// Read an index previously written by [`persist`](VectorIndex::persist).
    async fn load(location: &Path) -> Result<Self>
    where
        Self: Sized;
}
