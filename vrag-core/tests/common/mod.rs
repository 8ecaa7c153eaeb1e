//! Deterministic service fakes shared by the integration tests.
#![allow(dead_code)]

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use vrag_core::document::Chunk;
use vrag_core::linguistic::{Analysis, EntitySpan, FeatureSet, PartOfSpeech, Tagger, Token};
use vrag_core::{Embedder, GenerationRequest, Generator, RagError, Result};

/// Bag-of-words embedder: each lower-cased word increments a hashed bucket.
pub struct HashEmbedder {
    dims: usize,
}

impl HashEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims }
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0; self.dims];
        for word in text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            vector[(hasher.finish() % self.dims as u64) as usize] += 1.0;
        }
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dims
    }
}

/// Returns fixed vectors per exact text, and `fallback` for anything else.
/// Counts calls.
pub struct TableEmbedder {
    table: HashMap<String, Vec<f32>>,
    fallback: Vec<f32>,
    pub calls: AtomicUsize,
}

impl TableEmbedder {
    pub fn new<'a>(entries: impl IntoIterator<Item = (&'a str, Vec<f32>)>, fallback: Vec<f32>) -> Self {
        Self {
            table: entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
            fallback,
            calls: AtomicUsize::new(0),
        }
    }

    /// Every text embeds to `vector`.
    pub fn constant(vector: Vec<f32>) -> Self {
        Self { table: HashMap::new(), fallback: vector, calls: AtomicUsize::new(0) }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for TableEmbedder {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.table.get(text).cloned().unwrap_or_else(|| self.fallback.clone()))
    }

    fn dimensions(&self) -> usize {
        self.fallback.len()
    }
}

/// Always fails.
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed_query(&self, _text: &str) -> Result<Vec<f32>> {
        Err(RagError::EmbeddingError { provider: "failing".into(), message: "unavailable".into() })
    }

    fn dimensions(&self) -> usize {
        8
    }
}

/// Wraps another embedder and sleeps before query embeddings. With `only`
/// set, just queries containing that text are delayed.
pub struct SlowEmbedder<E> {
    pub inner: E,
    pub delay: Duration,
    pub only: Option<&'static str>,
}

#[async_trait]
impl<E: Embedder> Embedder for SlowEmbedder<E> {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        if self.only.is_none_or(|needle| text.contains(needle)) {
            tokio::time::sleep(self.delay).await;
        }
        self.inner.embed_query(text).await
    }

    async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.inner.embed_documents(texts).await
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }
}

/// Replies from a script, in order, and records every request.
#[derive(Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A generator whose next reply is an error.
    pub fn failing() -> Self {
        Self::failing_after(Vec::<String>::new())
    }

    /// Replies from `replies`, then fails once.
    pub fn failing_after<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let generator = Self::new(replies);
        generator.replies.lock().unwrap().push_back(Err(RagError::GenerationFailure {
            provider: "scripted".into(),
            message: "service unavailable".into(),
        }));
        generator
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The single user prompt of request `i`.
    pub fn prompt(&self, i: usize) -> String {
        self.requests()[i].messages[0].content.clone()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request);
        self.replies.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(RagError::GenerationFailure { provider: "scripted".into(), message: "script exhausted".into() })
        })
    }
}

/// Tags capitalised words as entity-bearing proper nouns and nothing else.
pub struct CapitalisedEntityTagger;

impl Tagger for CapitalisedEntityTagger {
    fn analyze(&self, text: &str) -> Analysis {
        let words: Vec<&str> = text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()).collect();
        let tokens = words
            .iter()
            .map(|w| Token {
                text: w.to_string(),
                pos: if w.chars().next().is_some_and(char::is_uppercase) {
                    PartOfSpeech::ProperNoun
                } else {
                    PartOfSpeech::Particle
                },
                is_stop: false,
                is_alpha: true,
            })
            .collect::<Vec<_>>();
        let entities = tokens
            .iter()
            .filter(|t| t.pos == PartOfSpeech::ProperNoun)
            .map(|t| EntitySpan { text: t.text.clone(), label: "MISC".into() })
            .collect();
        Analysis { tokens, entities, noun_chunks: Vec::new(), sentences: vec![text.to_string()] }
    }
}

/// A chunk with the given text and features.
pub fn chunk(id: &str, text: &str, features: FeatureSet) -> Chunk {
    Chunk {
        id: id.to_string(),
        text: text.to_string(),
        metadata: HashMap::new(),
        document_id: "doc".to_string(),
        chunk_index: 0,
        total_chunks: 1,
        length: text.chars().count(),
        source_id: id.to_string(),
        features,
    }
}

pub fn terms(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
