//! Per-user conversation state.
//!
//! A [`Session`] owns everything that the pipeline needs between calls: the
//! currently published index and the history of answered turns. Sessions are
//! passed explicitly to [`RagPipeline::answer`](crate::RagPipeline::answer);
//! nothing is kept in global state.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

use crate::context::{ContextPayload, RetrievalContext};
use crate::decomposer::SubQuestion;
use crate::validator::Answer;
use crate::vectorstore::VectorIndex;

/// An immutable, published index snapshot.
///
/// Requests pin the `Arc<IndexGeneration>` current when they start and keep
/// using it even if a newer generation is installed meanwhile.
pub struct IndexGeneration {
    /// Monotonic per session, starting at 1.
    pub generation: u64,
    pub index: Arc<dyn VectorIndex>,
}

impl std::fmt::Debug for IndexGeneration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexGeneration").field("generation", &self.generation).finish_non_exhaustive()
    }
}

/// One answered query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub query: String,
    pub sub_questions: Vec<SubQuestion>,
    /// Per-sub-question retrieval results, in sub-question order.
    pub contexts: Vec<RetrievalContext>,
    pub payload: ContextPayload,
    pub answer: Answer,
    /// Generation of the index the answer was grounded in.
    pub index_generation: u64,
    pub asked_at: DateTime<Utc>,
}

/// Explicit per-user context: current index generation plus chat history.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    generations: AtomicU64,
    index: RwLock<Option<Arc<IndexGeneration>>>,
    history: Mutex<Vec<Turn>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create a session with no index and an empty history.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            generations: AtomicU64::new(0),
            index: RwLock::new(None),
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Publish `index` as the new current generation and return its number.
    pub async fn install_index(&self, index: Arc<dyn VectorIndex>) -> u64 {
        let generation = self.generations.fetch_add(1, Ordering::SeqCst) + 1;
        *self.index.write().await = Some(Arc::new(IndexGeneration { generation, index }));
        info!(session.id = %self.id, generation, "installed index generation");
        generation
    }

    /// The generation new requests should use, if any.
    pub async fn current_index(&self) -> Option<Arc<IndexGeneration>> {
        self.index.read().await.clone()
    }

    /// A snapshot of the answered turns, oldest first.
    pub async fn history(&self) -> Vec<Turn> {
        self.history.lock().await.clone()
    }

    pub(crate) async fn record(&self, turn: Turn) {
        self.history.lock().await.push(turn);
    }

    /// Drop the index and the history. In-flight requests finish on the
    /// generation they pinned.
    pub async fn end(&self) {
        self.index.write().await.take();
        self.history.lock().await.clear();
        info!(session.id = %self.id, "session ended");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inmemory::InMemoryVectorIndex;

    #[tokio::test]
    async fn generations_increase_and_pins_survive() {
        let session = Session::new();
        assert!(session.current_index().await.is_none());

        assert_eq!(session.install_index(Arc::new(InMemoryVectorIndex::new())).await, 1);
        let pinned = session.current_index().await.unwrap();
        assert_eq!(session.install_index(Arc::new(InMemoryVectorIndex::new())).await, 2);

        assert_eq!(pinned.generation, 1);
        assert_eq!(session.current_index().await.unwrap().generation, 2);
    }

    #[tokio::test]
    async fn end_discards_index_and_history() {
        let session = Session::new();
        session.install_index(Arc::new(InMemoryVectorIndex::new())).await;
        session.end().await;
        assert!(session.current_index().await.is_none());
        assert!(session.history().await.is_empty());
    }
}
