//! Error types for the `vrag-core` crate.

use thiserror::Error;

/// Errors that can occur while indexing documents or answering a query.
///
/// An empty index is not an error (retrieval returns an empty `Vec`), and an
/// unparsable evaluator reply is a [`Validation::Unknown`](crate::Validation)
/// verdict rather than an error.
#[derive(Debug, Error)]
pub enum RagError {
    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The generation service failed. Terminal for the request it belongs to.
    #[error("Generation failure ({provider}): {message}")]
    GenerationFailure {
        /// The generator that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector index backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The vector index backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// Chunking a single document failed. Isolated to that document.
    #[error("Chunking failure for document '{document_id}': {message}")]
    ChunkingFailure {
        /// The document whose chunking was aborted.
        document_id: String,
        /// A description of the failure.
        message: String,
    },

    /// The decomposition output held no parsable question object.
    #[error("Malformed decomposition: {0}")]
    MalformedDecomposition(String),

    /// The document source could not be read.
    #[error("Source unavailable ({locator}): {message}")]
    SourceUnavailable {
        /// The locator that was requested.
        locator: String,
        /// A description of the failure.
        message: String,
    },

    /// Two chunks of one index build share a `source_id`.
    #[error("Duplicate chunk source_id: {0}")]
    DuplicateChunk(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An error in the pipeline orchestration.
    #[error("Pipeline error: {0}")]
    PipelineError(String),

    /// Filesystem error while persisting or loading.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// (De)serialization error while persisting or loading.
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// A convenience result type for pipeline operations.
pub type Result<T> = std::result::Result<T, RagError>;
