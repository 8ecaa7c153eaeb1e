//! # vrag-core
//!
//! Grounded retrieval-augmented question answering.
//!
//! ## Overview
//!
//! Indexing splits documents into semantically coherent chunks, enriches each
//! chunk with linguistic features, embeds it and adds it to a
//! [`VectorIndex`]. Answering decomposes a question into sub-questions,
//! retrieves and reranks candidate chunks for each of them concurrently,
//! assembles a grounded context, generates an answer and has it validated
//! against that context, regenerating once if the evaluator does not accept it.
//!
//! - [`SemanticChunker`] - embedding-distance breakpoints plus [`FeatureSet`] enrichment
//! - [`QueryDecomposer`] - JSON sub-question extraction with a single-question fallback
//! - [`Retriever`] - similarity or MMR selection over an index generation
//! - [`FeatureOverlapReranker`] - similarity plus entity/noun overlap boosts
//! - [`ContextAssembler`], [`AnswerGenerator`], [`AnswerValidator`]
//! - [`RagPipeline`] and [`Session`] - orchestration and per-user state
//!
//! Embedding and generation are consumed through the [`Embedder`] and
//! [`Generator`] traits. With the `openai` feature, the `openai` module provides
//! implementations for OpenAI-compatible servers.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vrag_core::{InMemoryVectorIndex, LocalDirectorySource, DocumentSource, RagPipeline, Session};
//!
//! let pipeline = RagPipeline::builder().embedder(embedder).generator(generator).build()?;
//! let documents = LocalDirectorySource::new().list_documents("./docs").await?;
//!
//! let index = Arc::new(InMemoryVectorIndex::new());
//! pipeline.build_index(&documents, index.as_ref()).await?;
//!
//! let session = Session::new();
//! session.install_index(index).await;
//! let turn = pipeline.answer(&session, "Who founded the company, and when?").await?;
//! ```

pub mod answer;
pub mod chunking;
pub mod config;
pub mod context;
pub mod decomposer;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generator;
pub mod inmemory;
pub mod linguistic;
pub mod pipeline;
pub mod reranker;
pub mod retriever;
pub mod session;
pub mod source;
pub mod validator;
pub mod vectorstore;

#[cfg(feature = "openai")]
pub mod openai;

pub use answer::{AnswerGenerator, INFORMATION_NOT_AVAILABLE};
pub use chunking::{BreakpointThreshold, ChunkBatch, SemanticChunker};
pub use config::{MAX_REGENERATIONS, RagConfig, RagConfigBuilder, UNRERANKED_CONTEXT_SIZE};
pub use context::{ContextAssembler, ContextPayload, RankedChunks, RetrievalContext};
pub use decomposer::{QueryDecomposer, SubQuestion};
pub use document::{Chunk, Document, SearchResult};
pub use embedding::{Embedder, cosine_similarity};
pub use error::{RagError, Result};
pub use generator::{GenerationRequest, Generator, Message, Role};
pub use inmemory::InMemoryVectorIndex;
pub use linguistic::{FeatureExtractor, FeatureSet, RuleBasedTagger, Tagger};
pub use pipeline::{IndexReport, RagPipeline, RagPipelineBuilder};
pub use reranker::{BoostWeights, FeatureOverlapReranker, Reranker, ScoredChunk};
pub use retriever::Retriever;
pub use session::{IndexGeneration, Session, Turn};
pub use source::{DocumentSource, LocalDirectorySource, clean_text};
pub use validator::{Answer, AnswerValidator, Validation};
pub use vectorstore::{SearchMode, VectorIndex};
