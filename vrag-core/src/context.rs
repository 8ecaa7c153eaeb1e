//! Grounded context assembly.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::UNRERANKED_CONTEXT_SIZE;
use crate::decomposer::SubQuestion;
use crate::document::Chunk;
use crate::reranker::ScoredChunk;

/// Chunks retrieved for one sub-question.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "chunks", rename_all = "snake_case")]
pub enum RankedChunks {
    /// Reranked, best first.
    Reranked(Vec<ScoredChunk>),
    /// Reranking disabled: retrieval order, no scores.
    RetrievalOrder(Vec<Arc<Chunk>>),
}

impl Default for RankedChunks {
    fn default() -> Self {
        Self::RetrievalOrder(Vec::new())
    }
}

impl RankedChunks {
    pub fn len(&self) -> usize {
        match self {
            Self::Reranked(scored) => scored.len(),
            Self::RetrievalOrder(chunks) => chunks.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The first `limit` chunks, in rank order.
    pub fn chunks(&self, limit: usize) -> Vec<&Chunk> {
        match self {
            Self::Reranked(scored) => scored.iter().take(limit).map(|s| s.chunk.as_ref()).collect(),
            Self::RetrievalOrder(chunks) => chunks.iter().take(limit).map(Arc::as_ref).collect(),
        }
    }
}

/// Retrieval outcome for one sub-question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalContext {
    pub question: SubQuestion,
    pub chunks: RankedChunks,
    /// Why retrieval produced nothing, if it failed or timed out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl RetrievalContext {
    pub fn new(question: SubQuestion, chunks: RankedChunks) -> Self {
        Self { question, chunks, failure: None }
    }

    /// An empty context recording why retrieval failed.
    pub fn failed(question: SubQuestion, failure: impl Into<String>) -> Self {
        Self { question, chunks: RankedChunks::default(), failure: Some(failure.into()) }
    }
}

/// The question/context text sent to the generator and the validator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextPayload {
    pub text: String,
    /// Ids of sub-questions that had no supporting chunks.
    pub unanswerable: Vec<String>,
}

/// Builds a [`ContextPayload`] from per-sub-question contexts.
///
/// Each sub-question renders as
///
/// ```text
///
/// Question {n}: {question}
///
/// Context {n}:
/// [{chunk texts joined by blank lines}]
/// ```
///
/// Sub-questions without chunks are kept with an empty `[]` context and an
/// explicit note marking them unanswerable.
#[derive(Debug, Clone, Copy)]
pub struct ContextAssembler {
    top_k: usize,
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

impl ContextAssembler {
    /// An assembler keeping the top `top_k` reranked chunks per sub-question.
    pub fn new(top_k: usize) -> Self {
        Self { top_k }
    }

    pub fn assemble(&self, contexts: &[RetrievalContext]) -> ContextPayload {
        let mut payload = ContextPayload::default();
        for (i, context) in contexts.iter().enumerate() {
            let n = i + 1;
            let limit = match context.chunks {
                RankedChunks::Reranked(_) => self.top_k,
                RankedChunks::RetrievalOrder(_) => UNRERANKED_CONTEXT_SIZE,
            };
            let joined = context
                .chunks
                .chunks(limit)
                .iter()
                .map(|chunk| chunk.text.as_str())
                .collect::<Vec<_>>()
                .join("\n\n");

            payload.text.push_str(&format!(
                "\nQuestion {n}: {}\n\nContext {n}:\n[{joined}]\n",
                context.question.text
            ));
            if context.chunks.is_empty() {
                payload.text.push_str(&format!(
                    "Note {n}: no supporting context was retrieved; this question is unanswerable from the provided context.\n"
                ));
                payload.unanswerable.push(context.question.id.clone());
            }
        }
        payload
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::linguistic::FeatureSet;

    fn chunk(text: &str) -> Arc<Chunk> {
        Arc::new(Chunk {
            id: text.into(),
            text: text.into(),
            metadata: HashMap::new(),
            document_id: "d".into(),
            chunk_index: 0,
            total_chunks: 1,
            length: text.len(),
            source_id: text.into(),
            features: FeatureSet::default(),
        })
    }

    fn scored(text: &str, score: f32) -> ScoredChunk {
        ScoredChunk { chunk: chunk(text), similarity: score, adjusted_score: score }
    }

    #[test]
    fn renders_question_and_context_blocks() {
        let contexts = vec![RetrievalContext::new(
            SubQuestion::new("Q1", "What is the capital of France?"),
            RankedChunks::Reranked(vec![scored("Paris is the capital.", 0.9), scored("France is big.", 0.5)]),
        )];
        let payload = ContextAssembler::default().assemble(&contexts);
        assert_eq!(
            payload.text,
            "\nQuestion 1: What is the capital of France?\n\nContext 1:\n[Paris is the capital.\n\nFrance is big.]\n"
        );
        assert!(payload.unanswerable.is_empty());
    }

    #[test]
    fn cuts_reranked_chunks_to_top_k() {
        let ranked = (0..8).map(|i| scored(&format!("c{i}"), 1.0 - i as f32 / 10.0)).collect();
        let contexts =
            vec![RetrievalContext::new(SubQuestion::new("Q1", "q"), RankedChunks::Reranked(ranked))];
        let payload = ContextAssembler::new(3).assemble(&contexts);
        assert!(payload.text.contains("[c0\n\nc1\n\nc2]"));
    }

    #[test]
    fn empty_context_is_kept_and_marked() {
        let contexts = vec![
            RetrievalContext::new(
                SubQuestion::new("Q1", "First?"),
                RankedChunks::RetrievalOrder(vec![chunk("fact")]),
            ),
            RetrievalContext::failed(SubQuestion::new("Q2", "Second?"), "timed out"),
        ];
        let payload = ContextAssembler::default().assemble(&contexts);
        assert!(payload.text.contains("Question 2: Second?\n\nContext 2:\n[]\nNote 2:"));
        assert_eq!(payload.unanswerable, vec!["Q2"]);
    }
}
