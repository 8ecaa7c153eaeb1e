//! Hybrid reranking of retrieved chunks.
//!
//! Candidates are re-scored by embedding similarity to the question plus a
//! lexical boost for every question term that the chunk's precomputed
//! [`FeatureSet`](crate::FeatureSet) also contains.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::document::{Chunk, SearchResult};
use crate::embedding::{Embedder, cosine_similarity};
use crate::error::{RagError, Result};
use crate::linguistic::FeatureExtractor;

/// A chunk with its similarity and boosted score. The chunk itself is shared,
/// never modified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Arc<Chunk>,
    /// Cosine similarity between question and chunk embeddings.
    pub similarity: f32,
    /// `similarity` plus the lexical boost. Never below `similarity`.
    pub adjusted_score: f32,
}

/// A reranker that re-scores and reorders retrieval candidates.
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Rerank `candidates` for `question`.
    ///
    /// Returns one [`ScoredChunk`] per candidate ordered by descending
    /// `adjusted_score`; equal scores keep retrieval order.
    async fn rerank(&self, question: &str, candidates: Vec<SearchResult>) -> Result<Vec<ScoredChunk>>;
}

/// Per-term boosts applied when a question term appears in a chunk feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoostWeights {
    noun: f32,
    entity: f32,
    noun_chunk: f32,
}

impl Default for BoostWeights {
    fn default() -> Self {
        Self { noun: 0.05, entity: 0.10, noun_chunk: 0.07 }
    }
}

impl BoostWeights {
    /// Custom weights.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if any weight is negative or not finite.
    pub fn new(noun: f32, entity: f32, noun_chunk: f32) -> Result<Self> {
        for (name, weight) in [("noun", noun), ("entity", entity), ("noun_chunk", noun_chunk)] {
            if !(weight.is_finite() && weight >= 0.0) {
                return Err(RagError::ConfigError(format!(
                    "{name} boost ({weight}) must be a non-negative number"
                )));
            }
        }
        Ok(Self { noun, entity, noun_chunk })
    }

    pub fn noun(&self) -> f32 {
        self.noun
    }

    pub fn entity(&self) -> f32 {
        self.entity
    }

    pub fn noun_chunk(&self) -> f32 {
        self.noun_chunk
    }

    /// Total boost of `chunk` for a set of normalised question terms.
    pub fn boost(&self, terms: &BTreeSet<String>, chunk: &Chunk) -> f32 {
        let features = &chunk.features;
        terms
            .iter()
            .map(|term| {
                let mut boost = 0.0;
                if features.nouns.contains(term) {
                    boost += self.noun;
                }
                if features.entities.contains(term) {
                    boost += self.entity;
                }
                if features.noun_chunks.contains(term) {
                    boost += self.noun_chunk;
                }
                boost
            })
            .sum()
    }
}

/// Reranks by embedding similarity plus entity and noun overlap.
///
/// # Example
///
/// ```rust,ignore
/// use vrag_core::{FeatureOverlapReranker, Reranker};
///
/// let reranker = FeatureOverlapReranker::new(embedder);
/// let scored = reranker.rerank("What is the capital of France?", candidates).await?;
/// ```
#[derive(Clone)]
pub struct FeatureOverlapReranker {
    embedder: Arc<dyn Embedder>,
    extractor: FeatureExtractor,
    weights: BoostWeights,
}

impl std::fmt::Debug for FeatureOverlapReranker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureOverlapReranker").field("weights", &self.weights).finish_non_exhaustive()
    }
}

impl FeatureOverlapReranker {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder, extractor: FeatureExtractor::default(), weights: BoostWeights::default() }
    }

    pub fn with_extractor(mut self, extractor: FeatureExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_weights(mut self, weights: BoostWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Normalised entities and nouns of the question, as a set.
    fn question_terms(&self, question: &str) -> BTreeSet<String> {
        let features = self.extractor.extract(question);
        features.entities.into_iter().chain(features.nouns).collect()
    }
}

#[async_trait]
impl Reranker for FeatureOverlapReranker {
    async fn rerank(&self, question: &str, candidates: Vec<SearchResult>) -> Result<Vec<ScoredChunk>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let question_vector = self.embedder.embed_query(question).await?;
        let texts: Vec<&str> = candidates.iter().map(|c| c.chunk.text.as_str()).collect();
        let vectors = self.embedder.embed_documents(&texts).await?;
        if vectors.len() != candidates.len() {
            return Err(RagError::EmbeddingError {
                provider: "reranker".to_string(),
                message: format!(
                    "expected {} embeddings, received {}",
                    candidates.len(),
                    vectors.len()
                ),
            });
        }

        let terms = self.question_terms(question);
        let mut scored: Vec<ScoredChunk> = candidates
            .into_iter()
            .zip(vectors)
            .map(|(candidate, vector)| {
                let similarity = cosine_similarity(&question_vector, &vector);
                let adjusted_score = similarity + self.weights.boost(&terms, &candidate.chunk);
                ScoredChunk { chunk: candidate.chunk, similarity, adjusted_score }
            })
            .collect();
        scored.sort_by(|a, b| b.adjusted_score.total_cmp(&a.adjusted_score));

        debug!(question, term_count = terms.len(), candidate_count = scored.len(), "reranked candidates");
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::linguistic::FeatureSet;

    fn chunk_with(nouns: &[&str], entities: &[&str], noun_chunks: &[&str]) -> Chunk {
        let owned = |v: &[&str]| v.iter().map(|s| s.to_string()).collect();
        Chunk {
            id: "c".into(),
            text: "c".into(),
            metadata: HashMap::new(),
            document_id: "d".into(),
            chunk_index: 0,
            total_chunks: 1,
            length: 1,
            source_id: "c".into(),
            features: FeatureSet {
                nouns: owned(nouns),
                entities: owned(entities),
                noun_chunks: owned(noun_chunks),
                ..FeatureSet::default()
            },
        }
    }

    fn terms(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn categories_accumulate_per_term() {
        let chunk = chunk_with(&["paris"], &["paris"], &["paris"]);
        let boost = BoostWeights::default().boost(&terms(&["paris"]), &chunk);
        assert!((boost - 0.22).abs() < 1e-6);
    }

    #[test]
    fn unmatched_terms_add_nothing() {
        let chunk = chunk_with(&["river"], &[], &[]);
        assert_eq!(BoostWeights::default().boost(&terms(&["paris", "capital"]), &chunk), 0.0);
    }

    #[test]
    fn negative_weights_are_rejected() {
        assert!(BoostWeights::new(0.1, -0.1, 0.0).is_err());
        assert!(BoostWeights::new(f32::NAN, 0.1, 0.0).is_err());
        let weights = BoostWeights::new(0.0, 0.2, 0.0).unwrap();
        assert_eq!(weights.entity(), 0.2);
    }
}
