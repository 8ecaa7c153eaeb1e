//! Semantic document chunking.
//!
//! [`SemanticChunker`] splits a document into sentences, embeds each sentence
//! together with its neighbours, and starts a new chunk wherever the embedding
//! distance between consecutive groups exceeds a threshold derived from the
//! document's own distance distribution.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::document::{Chunk, Document};
use crate::embedding::{Embedder, cosine_similarity};
use crate::error::{RagError, Result};
use crate::linguistic::FeatureExtractor;

/// Sentence boundary: terminal punctuation followed by whitespace.
static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.?!]\s+").expect("sentence regex is valid"));

/// Number of neighbouring sentences combined on each side before embedding.
const BUFFER_SIZE: usize = 1;

/// How the breakpoint threshold is derived from a document's distances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakpointThreshold {
    /// The given percentile (0–100] of the distances, linearly interpolated.
    Percentile(f32),
    /// Mean plus the given multiple of the population standard deviation.
    StandardDeviation(f32),
    /// Mean plus the given multiple of the interquartile range.
    Interquartile(f32),
}

impl Default for BreakpointThreshold {
    fn default() -> Self {
        Self::Percentile(85.0)
    }
}

impl BreakpointThreshold {
    /// Standard-deviation strategy with its usual factor of 3.
    pub const STANDARD_DEVIATION: Self = Self::StandardDeviation(3.0);
    /// Interquartile strategy with its usual factor of 1.5.
    pub const INTERQUARTILE: Self = Self::Interquartile(1.5);

    /// Check the strategy parameter is in range.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Percentile(p) if !(p > 0.0 && p <= 100.0) => Err(RagError::ConfigError(
                format!("breakpoint percentile ({p}) must be within (0, 100]"),
            )),
            Self::StandardDeviation(f) | Self::Interquartile(f) if !(f.is_finite() && f >= 0.0) => {
                Err(RagError::ConfigError(format!(
                    "breakpoint factor ({f}) must be a non-negative number"
                )))
            }
            _ => Ok(()),
        }
    }

    /// The threshold for a non-empty distance list.
    fn threshold(&self, distances: &[f32]) -> f32 {
        match *self {
            Self::Percentile(p) => percentile(distances, p),
            Self::StandardDeviation(factor) => {
                let mean = mean(distances);
                let variance = distances.iter().map(|d| (d - mean).powi(2)).sum::<f32>()
                    / distances.len() as f32;
                mean + factor * variance.sqrt()
            }
            Self::Interquartile(factor) => {
                let iqr = percentile(distances, 75.0) - percentile(distances, 25.0);
                mean(distances) + factor * iqr
            }
        }
    }
}

fn mean(values: &[f32]) -> f32 {
    values.iter().sum::<f32>() / values.len() as f32
}

/// Percentile with linear interpolation between closest ranks.
fn percentile(values: &[f32], p: f32) -> f32 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f32::total_cmp);
    let rank = p / 100.0 * (sorted.len() - 1) as f32;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (rank - lower as f32)
}

/// Split text into sentences on `.`, `?` or `!` followed by whitespace.
///
/// Punctuation stays with its sentence; the whitespace is dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for boundary in SENTENCE_END.find_iter(text) {
        sentences.push(&text[start..=boundary.start()]);
        start = boundary.end();
    }
    sentences.push(&text[start..]);
    sentences.into_iter().map(str::trim).filter(|s| !s.is_empty()).collect()
}

/// Each sentence joined with up to [`BUFFER_SIZE`] neighbours on either side.
fn combine_with_neighbours(sentences: &[&str]) -> Vec<String> {
    (0..sentences.len())
        .map(|i| {
            let from = i.saturating_sub(BUFFER_SIZE);
            let to = (i + BUFFER_SIZE + 1).min(sentences.len());
            sentences[from..to].join(" ")
        })
        .collect()
}

/// Chunks produced from a batch of documents, plus per-document failures.
#[derive(Debug, Default)]
pub struct ChunkBatch {
    pub chunks: Vec<Chunk>,
    /// One [`RagError::ChunkingFailure`] per document that could not be chunked.
    pub failures: Vec<RagError>,
}

/// Splits documents at semantic breakpoints and enriches each chunk with
/// linguistic features.
///
/// # Example
///
/// ```rust,ignore
/// use vrag_core::{BreakpointThreshold, SemanticChunker};
///
/// let chunker = SemanticChunker::new(embedder).with_threshold(BreakpointThreshold::INTERQUARTILE);
/// let batch = chunker.chunk(&documents).await;
/// ```
#[derive(Clone)]
pub struct SemanticChunker {
    embedder: Arc<dyn Embedder>,
    extractor: FeatureExtractor,
    threshold: BreakpointThreshold,
}

impl std::fmt::Debug for SemanticChunker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticChunker").field("threshold", &self.threshold).finish_non_exhaustive()
    }
}

impl SemanticChunker {
    /// Create a chunker with the default threshold and feature extractor.
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            extractor: FeatureExtractor::default(),
            threshold: BreakpointThreshold::default(),
        }
    }

    pub fn with_threshold(mut self, threshold: BreakpointThreshold) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_extractor(mut self, extractor: FeatureExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Chunk every document. A failing document is recorded and skipped.
    pub async fn chunk(&self, documents: &[Document]) -> ChunkBatch {
        let mut batch = ChunkBatch::default();
        for document in documents {
            match self.chunk_document(document).await {
                Ok(chunks) => batch.chunks.extend(chunks),
                Err(e) => {
                    warn!(document.id = %document.id, error = %e, "skipping document that failed to chunk");
                    batch.failures.push(e);
                }
            }
        }
        debug!(
            documents = documents.len(),
            chunk_count = batch.chunks.len(),
            failures = batch.failures.len(),
            "chunked documents"
        );
        batch
    }

    /// Chunk one document.
    ///
    /// Empty documents produce no chunks. Single-sentence documents produce one
    /// chunk without calling the embedder.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ChunkingFailure`] if the embedder fails.
    pub async fn chunk_document(&self, document: &Document) -> Result<Vec<Chunk>> {
        let sentences = split_sentences(&document.text);
        if sentences.is_empty() {
            return Ok(Vec::new());
        }

        let groups = self.group_sentences(document, &sentences).await?;
        let total_chunks = groups.len();
        let chunks = groups
            .into_iter()
            .enumerate()
            .map(|(chunk_index, text)| {
                let source_id = document.chunk_source_id(chunk_index);
                Chunk {
                    id: source_id.clone(),
                    length: text.chars().count(),
                    features: self.extractor.extract(&text),
                    text,
                    metadata: document.metadata.clone(),
                    document_id: document.id.clone(),
                    chunk_index,
                    total_chunks,
                    source_id,
                }
            })
            .collect::<Vec<_>>();

        debug!(document.id = %document.id, chunk_count = chunks.len(), "chunked document");
        Ok(chunks)
    }

    /// Join sentences between breakpoints into chunk texts.
    async fn group_sentences(&self, document: &Document, sentences: &[&str]) -> Result<Vec<String>> {
        if sentences.len() == 1 {
            return Ok(vec![sentences[0].to_string()]);
        }

        let failure = |message: String| RagError::ChunkingFailure {
            document_id: document.id.clone(),
            message,
        };
        let combined = combine_with_neighbours(sentences);
        let texts: Vec<&str> = combined.iter().map(String::as_str).collect();
        let embeddings =
            self.embedder.embed_documents(&texts).await.map_err(|e| failure(e.to_string()))?;
        if embeddings.len() != texts.len() {
            return Err(failure(format!(
                "embedder returned {} vectors for {} sentence groups",
                embeddings.len(),
                texts.len()
            )));
        }

        let distances: Vec<f32> =
            embeddings.windows(2).map(|pair| 1.0 - cosine_similarity(&pair[0], &pair[1])).collect();
        let threshold = self.threshold.threshold(&distances);

        let mut groups = Vec::new();
        let mut start = 0;
        for (i, _) in distances.iter().enumerate().filter(|(_, d)| **d > threshold) {
            groups.push(sentences[start..=i].join(" "));
            start = i + 1;
        }
        if start < sentences.len() {
            groups.push(sentences[start..].join(" "));
        }
        Ok(groups)
    }
}
