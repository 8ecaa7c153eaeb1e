//! Data types for documents, chunks, and search results.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::linguistic::FeatureSet;

/// Metadata key holding the source identifier (usually a file name).
pub const SOURCE_KEY: &str = "source";
/// Metadata key holding the 1-based page number.
pub const PAGE_KEY: &str = "page";

/// A source document containing text content and metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document.
    pub id: String,
    /// The text content of the document.
    pub text: String,
    /// Key-value metadata, including [`SOURCE_KEY`] and [`PAGE_KEY`].
    pub metadata: HashMap<String, String>,
    /// Optional URI pointing to the original source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_uri: Option<String>,
}

impl Document {
    /// Create a document with `source` and `page` metadata filled in.
    pub fn new(source: impl Into<String>, page: usize, text: impl Into<String>) -> Self {
        let source = source.into();
        let metadata = HashMap::from([
            (SOURCE_KEY.to_string(), source.clone()),
            (PAGE_KEY.to_string(), page.to_string()),
        ]);
        Self { id: format!("{source}#{page}"), text: text.into(), metadata, source_uri: None }
    }

    /// The source identifier, or `"unknown"` when absent.
    pub fn source(&self) -> &str {
        self.metadata.get(SOURCE_KEY).map(String::as_str).unwrap_or("unknown")
    }

    /// The page number as recorded in metadata, or `"NA"` when absent.
    pub fn page(&self) -> &str {
        self.metadata.get(PAGE_KEY).map(String::as_str).unwrap_or("NA")
    }

    /// Derive the `source_id` of this document's chunk at `chunk_index`.
    pub fn chunk_source_id(&self, chunk_index: usize) -> String {
        format!("{}_p{}_c{chunk_index}", self.source(), self.page())
    }
}

/// A contiguous fragment of a [`Document`] plus derived metadata.
///
/// Chunks are created by the [`SemanticChunker`](crate::SemanticChunker) and
/// never mutated afterwards; indexes hand them out as `Arc<Chunk>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier for the chunk. Equal to `source_id`.
    pub id: String,
    /// The text content of the chunk.
    pub text: String,
    /// Metadata inherited from the parent document.
    pub metadata: HashMap<String, String>,
    /// The ID of the parent [`Document`].
    pub document_id: String,
    /// 0-based position of this chunk within its document.
    pub chunk_index: usize,
    /// Number of chunks the parent document produced.
    pub total_chunks: usize,
    /// Length of `text` in characters.
    pub length: usize,
    /// `{source}_p{page}_c{chunk_index}`, unique within one index build.
    pub source_id: String,
    /// Linguistic features of `text`.
    pub features: FeatureSet,
}

/// A retrieved [`Chunk`] paired with its vector similarity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Arc<Chunk>,
    /// The similarity score (higher is more relevant).
    pub score: f32,
}
