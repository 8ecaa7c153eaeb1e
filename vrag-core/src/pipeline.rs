//! RAG pipeline orchestrator.
//!
//! The [`RagPipeline`] coordinates indexing (chunk → embed → add) and
//! answering (decompose → retrieve and rerank per sub-question → assemble →
//! generate → validate → regenerate once if needed).
//!
//! # Example
//!
//! ```rust,ignore
//! use vrag_core::{InMemoryVectorIndex, RagConfig, RagPipeline, Session};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedder(Arc::new(my_embedder))
//!     .generator(Arc::new(my_generator))
//!     .build()?;
//!
//! let index = Arc::new(InMemoryVectorIndex::new());
//! pipeline.build_index(&documents, index.as_ref()).await?;
//!
//! let session = Session::new();
//! session.install_index(index).await;
//! let turn = pipeline.answer(&session, "What is the capital of France?").await?;
//! println!("{}", turn.answer.text);
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, error, info, warn};

use crate::answer::AnswerGenerator;
use crate::chunking::SemanticChunker;
use crate::config::{MAX_REGENERATIONS, RagConfig, UNRERANKED_CONTEXT_SIZE};
use crate::context::{ContextAssembler, RankedChunks, RetrievalContext};
use crate::decomposer::{QueryDecomposer, SubQuestion};
use crate::document::Document;
use crate::embedding::Embedder;
use crate::error::{RagError, Result};
use crate::generator::Generator;
use crate::linguistic::{FeatureExtractor, Tagger};
use crate::reranker::{FeatureOverlapReranker, Reranker};
use crate::retriever::Retriever;
use crate::session::{Session, Turn};
use crate::validator::{Answer, AnswerValidator, Validation};
use crate::vectorstore::VectorIndex;

/// Outcome of [`RagPipeline::build_index`].
#[derive(Debug, Default)]
pub struct IndexReport {
    /// Documents submitted.
    pub documents: usize,
    /// Chunks added to the index.
    pub chunks: usize,
    /// Chunks dropped because their `source_id` was already used in this build.
    pub skipped_duplicates: usize,
    /// Documents that could not be chunked, as [`RagError::ChunkingFailure`]s.
    pub failures: Vec<RagError>,
}

/// The RAG pipeline orchestrator.
///
/// Holds no per-user state: the index and history live in the [`Session`]
/// passed to [`answer`](RagPipeline::answer). Construct one via
/// [`RagPipeline::builder()`].
pub struct RagPipeline {
    config: RagConfig,
    embedder: Arc<dyn Embedder>,
    chunker: SemanticChunker,
    retriever: Retriever,
    reranker: Arc<dyn Reranker>,
    decomposer: QueryDecomposer,
    assembler: ContextAssembler,
    answerer: AnswerGenerator,
    validator: AnswerValidator,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the embedder.
    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    /// Chunk, embed and add `documents` to `index`.
    ///
    /// Documents that fail to chunk are reported, not fatal. Chunks whose
    /// `source_id` repeats within this build are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::PipelineError`] if embedding fails, or the index
    /// error if adding fails.
    pub async fn build_index(
        &self,
        documents: &[Document],
        index: &dyn VectorIndex,
    ) -> Result<IndexReport> {
        let batch = self.chunker.chunk(documents).await;
        let mut report = IndexReport {
            documents: documents.len(),
            failures: batch.failures,
            ..IndexReport::default()
        };

        let mut seen = HashSet::new();
        let mut chunks = Vec::with_capacity(batch.chunks.len());
        for chunk in batch.chunks {
            if seen.insert(chunk.source_id.clone()) {
                chunks.push(chunk);
            } else {
                warn!(source_id = %chunk.source_id, "skipping chunk with duplicate source_id");
                report.skipped_duplicates += 1;
            }
        }
        if chunks.is_empty() {
            info!(documents = report.documents, chunk_count = 0, "built index (empty)");
            return Ok(report);
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let vectors = self.embedder.embed_documents(&texts).await.map_err(|e| {
            error!(chunk_count = texts.len(), error = %e, "embedding failed during indexing");
            RagError::PipelineError(format!("embedding failed for {} chunks: {e}", texts.len()))
        })?;

        report.chunks = chunks.len();
        index
            .add(chunks, vectors)
            .await
            .inspect_err(|e| error!(error = %e, "adding chunks to the index failed"))?;

        info!(
            documents = report.documents,
            chunk_count = report.chunks,
            failures = report.failures.len(),
            skipped_duplicates = report.skipped_duplicates,
            "built index"
        );
        Ok(report)
    }

    /// Answer `query` against the session's current index generation and
    /// record the resulting [`Turn`] in the session history.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::PipelineError`] if the session has no index, and
    /// [`RagError::GenerationFailure`] if decomposition, generation or
    /// validation fails. Per-sub-question retrieval failures do not abort the
    /// request; they produce an empty context instead.
    pub async fn answer(&self, session: &Session, query: &str) -> Result<Turn> {
        let pinned = session.current_index().await.ok_or_else(|| {
            RagError::PipelineError("no index is installed in this session".to_string())
        })?;

        let sub_questions = self
            .decomposer
            .decompose_or_single(query)
            .await
            .inspect_err(|e| error!(error = %e, "query decomposition failed"))?;

        let contexts = join_all(
            sub_questions.iter().map(|question| self.retrieve_context(pinned.index.as_ref(), question)),
        )
        .await;

        let payload = self.assembler.assemble(&contexts);
        let first = self.answerer.generate(&payload).await?;
        let validation = self.validator.validate(&payload, &first).await?;

        let mut answer = Answer { text: first, validation, regenerated: false };
        if validation != Validation::Valid {
            for _ in 0..MAX_REGENERATIONS {
                warn!(%validation, "answer not validated, regenerating");
                answer.text = self.answerer.generate(&payload).await?;
                answer.regenerated = true;
            }
        }

        info!(
            session.id = %session.id(),
            generation = pinned.generation,
            sub_question_count = sub_questions.len(),
            unanswerable = payload.unanswerable.len(),
            %validation,
            regenerated = answer.regenerated,
            "answered query"
        );

        let turn = Turn {
            query: query.to_string(),
            sub_questions,
            contexts,
            payload,
            answer,
            index_generation: pinned.generation,
            asked_at: Utc::now(),
        };
        session.record(turn.clone()).await;
        Ok(turn)
    }

    /// Retrieve and rank chunks for one sub-question under the configured
    /// timeout. Failures yield an empty context.
    async fn retrieve_context(&self, index: &dyn VectorIndex, question: &SubQuestion) -> RetrievalContext {
        let timeout = self.config.sub_question_timeout();
        match tokio::time::timeout(timeout, self.rank(index, &question.text)).await {
            Ok(Ok(chunks)) => {
                debug!(sub_question = %question.id, chunk_count = chunks.len(), "retrieved context");
                RetrievalContext::new(question.clone(), chunks)
            }
            Ok(Err(e)) => {
                warn!(sub_question = %question.id, error = %e, "retrieval failed, continuing without context");
                RetrievalContext::failed(question.clone(), e.to_string())
            }
            Err(_) => {
                warn!(sub_question = %question.id, timeout = ?timeout, "retrieval timed out");
                RetrievalContext::failed(question.clone(), format!("retrieval timed out after {timeout:?}"))
            }
        }
    }

    async fn rank(&self, index: &dyn VectorIndex, question: &str) -> Result<RankedChunks> {
        let candidates = self.retriever.retrieve(index, question).await?;
        if !self.config.reranking_enabled {
            return Ok(RankedChunks::RetrievalOrder(
                candidates.into_iter().take(UNRERANKED_CONTEXT_SIZE).map(|c| c.chunk).collect(),
            ));
        }
        Ok(RankedChunks::Reranked(self.reranker.rerank(question, candidates).await?))
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// The embedder and generator are required. Without an explicit reranker a
/// [`FeatureOverlapReranker`] over the same embedder and tagger is used.
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = RagPipeline::builder()
///     .embedder(Arc::new(embedder))
///     .generator(Arc::new(generator))
///     .tagger(Arc::new(my_tagger))      // optional
///     .reranker(Arc::new(reranker))     // optional
///     .build()?;
/// ```
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedder: Option<Arc<dyn Embedder>>,
    generator: Option<Arc<dyn Generator>>,
    tagger: Option<Arc<dyn Tagger>>,
    reranker: Option<Arc<dyn Reranker>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration. Defaults to [`RagConfig::default`].
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedder.
    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the generator used for decomposition, answering and validation.
    pub fn generator(mut self, generator: Arc<dyn Generator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Set the tagger behind feature extraction.
    pub fn tagger(mut self, tagger: Arc<dyn Tagger>) -> Self {
        self.tagger = Some(tagger);
        self
    }

    /// Replace the default reranker.
    pub fn reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    /// Build the [`RagPipeline`], validating the configuration and that all
    /// required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if a required field is missing or the
    /// configuration is invalid.
    pub fn build(self) -> Result<RagPipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let embedder =
            self.embedder.ok_or_else(|| RagError::ConfigError("embedder is required".to_string()))?;
        let generator =
            self.generator.ok_or_else(|| RagError::ConfigError("generator is required".to_string()))?;

        let extractor = self.tagger.map(FeatureExtractor::new).unwrap_or_default();
        let reranker = self.reranker.unwrap_or_else(|| {
            Arc::new(FeatureOverlapReranker::new(embedder.clone()).with_extractor(extractor.clone()))
        });

        Ok(RagPipeline {
            chunker: SemanticChunker::new(embedder.clone())
                .with_threshold(config.breakpoint)
                .with_extractor(extractor),
            retriever: Retriever::new(embedder.clone(), config.retrieval_k, config.search_mode),
            reranker,
            decomposer: QueryDecomposer::new(generator.clone(), config.decomposition_max_tokens),
            assembler: ContextAssembler::new(config.rerank_top_k),
            answerer: AnswerGenerator::new(
                generator.clone(),
                config.answer_temperature,
                config.answer_max_tokens,
            ),
            validator: AnswerValidator::new(
                generator,
                config.validation_temperature,
                config.validation_max_tokens,
            ),
            embedder,
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_embedder_and_generator() {
        let Err(err) = RagPipeline::builder().build() else {
            panic!("builder without services must fail");
        };
        assert!(err.to_string().contains("embedder is required"));
    }
}
