//! In-memory vector index using cosine similarity.
//!
//! This module provides [`InMemoryVectorIndex`], a vector index backed by a
//! `Vec` protected by a `tokio::sync::RwLock`, with JSON persistence. It is
//! suitable for document sets that fit in memory.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::document::{Chunk, SearchResult};
use crate::embedding::cosine_similarity;
use crate::error::{RagError, Result};
use crate::vectorstore::{SearchMode, VectorIndex};

/// File name of the persisted index inside its location directory.
pub const INDEX_FILE: &str = "index.json";

const BACKEND: &str = "InMemory";
const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexEntry {
    chunk: Arc<Chunk>,
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedIndex {
    version: u32,
    entries: Vec<IndexEntry>,
}

/// An in-memory vector index using cosine similarity for search.
///
/// Entries keep insertion order, which breaks ties between equal scores.
/// All operations are async-safe via `tokio::sync::RwLock`.
///
/// # Example
///
/// ```rust,ignore
/// use vrag_core::{InMemoryVectorIndex, VectorIndex};
///
/// let index = InMemoryVectorIndex::new();
/// index.add(chunks, vectors).await?;
/// index.persist(Path::new("store/0001")).await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryVectorIndex {
    entries: RwLock<Vec<IndexEntry>>,
}

impl InMemoryVectorIndex {
    /// Create a new empty in-memory index.
    pub fn new() -> Self {
        Self::default()
    }
}

fn store_error(message: impl Into<String>) -> RagError {
    RagError::VectorStoreError { backend: BACKEND.to_string(), message: message.into() }
}

/// Greedy maximal-marginal-relevance selection.
///
/// `candidates` are `(entry, similarity to query)` pairs sorted by descending
/// similarity. Returns positions into `candidates` in selection order.
fn maximal_marginal_relevance(
    candidates: &[(&IndexEntry, f32)],
    k: usize,
    lambda: f32,
) -> Vec<usize> {
    let k = k.min(candidates.len());
    let mut selected: Vec<usize> = Vec::with_capacity(k);
    if k == 0 {
        return selected;
    }
    selected.push(0);

    // Highest similarity of each candidate to anything already selected.
    let mut redundancy: Vec<f32> = candidates
        .iter()
        .map(|(entry, _)| cosine_similarity(&entry.embedding, &candidates[0].0.embedding))
        .collect();

    while selected.len() < k {
        let mut best: Option<(usize, f32)> = None;
        for (i, (_, relevance)) in candidates.iter().enumerate() {
            if selected.contains(&i) {
                continue;
            }
            let score = lambda * relevance - (1.0 - lambda) * redundancy[i];
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((i, score));
            }
        }
        let Some((next, _)) = best else { break };
        selected.push(next);
        let picked = &candidates[next].0.embedding;
        for (i, (entry, _)) in candidates.iter().enumerate() {
            redundancy[i] = redundancy[i].max(cosine_similarity(&entry.embedding, picked));
        }
    }
    selected
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn add(&self, chunks: Vec<Chunk>, vectors: Vec<Vec<f32>>) -> Result<()> {
        if chunks.len() != vectors.len() {
            return Err(store_error(format!(
                "{} chunks but {} vectors",
                chunks.len(),
                vectors.len()
            )));
        }

        let mut entries = self.entries.write().await;
        let dimensions = entries.first().map(|e| e.embedding.len()).or(vectors.first().map(Vec::len));
        let mut seen: HashSet<&str> = entries.iter().map(|e| e.chunk.source_id.as_str()).collect();
        for (chunk, vector) in chunks.iter().zip(&vectors) {
            if !seen.insert(chunk.source_id.as_str()) {
                return Err(RagError::DuplicateChunk(chunk.source_id.clone()));
            }
            if Some(vector.len()) != dimensions {
                return Err(store_error(format!(
                    "chunk '{}' has {} dimensions, index expects {}",
                    chunk.source_id,
                    vector.len(),
                    dimensions.unwrap_or_default()
                )));
            }
        }
        drop(seen);

        let added = chunks.len();
        entries.extend(
            chunks
                .into_iter()
                .zip(vectors)
                .map(|(chunk, embedding)| IndexEntry { chunk: Arc::new(chunk), embedding }),
        );
        debug!(added, total = entries.len(), "added chunks to in-memory index");
        Ok(())
    }

    async fn similarity_search(
        &self,
        query_vector: &[f32],
        k: usize,
        mode: SearchMode,
    ) -> Result<Vec<SearchResult>> {
        let entries = self.entries.read().await;
        if entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(&IndexEntry, f32)> = entries
            .iter()
            .map(|entry| (entry, cosine_similarity(&entry.embedding, query_vector)))
            .collect();
        // NaN similarities (from NaN vector components) rank last.
        let rank = |score: f32| if score.is_nan() { f32::NEG_INFINITY } else { score };
        scored.sort_by(|a, b| rank(b.1).total_cmp(&rank(a.1)));

        let picked: Vec<(&IndexEntry, f32)> = match mode {
            SearchMode::Similarity => scored.into_iter().take(k).collect(),
            SearchMode::Mmr { fetch_k, lambda } => {
                scored.truncate(fetch_k.max(k));
                maximal_marginal_relevance(&scored, k, lambda)
                    .into_iter()
                    .map(|i| scored[i])
                    .collect()
            }
        };

        Ok(picked
            .into_iter()
            .map(|(entry, score)| SearchResult { chunk: Arc::clone(&entry.chunk), score })
            .collect())
    }

    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    async fn persist(&self, location: &Path) -> Result<()> {
        let entries = self.entries.read().await;
        let persisted = PersistedIndex { version: FORMAT_VERSION, entries: entries.clone() };
        let json = serde_json::to_vec(&persisted)?;
        tokio::fs::create_dir_all(location).await?;
        let path = location.join(INDEX_FILE);
        tokio::fs::write(&path, json).await?;
        debug!(path = %path.display(), entries = entries.len(), "persisted in-memory index");
        Ok(())
    }

    async fn load(location: &Path) -> Result<Self> {
        let path = location.join(INDEX_FILE);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| store_error(format!("failed to read '{}': {e}", path.display())))?;
        let persisted: PersistedIndex = serde_json::from_slice(&bytes)?;
        if persisted.version != FORMAT_VERSION {
            return Err(store_error(format!(
                "unsupported index format version {} in '{}'",
                persisted.version,
                path.display()
            )));
        }
        debug!(path = %path.display(), entries = persisted.entries.len(), "loaded in-memory index");
        Ok(Self { entries: RwLock::new(persisted.entries) })
    }
}
