//! Property tests for in-memory vector index selection.

mod common;

use std::collections::HashSet;

use proptest::prelude::*;
use vrag_core::document::Chunk;
use vrag_core::inmemory::InMemoryVectorIndex;
use vrag_core::linguistic::FeatureSet;
use vrag_core::vectorstore::{SearchMode, VectorIndex};

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map(
        "non-zero embedding",
        |mut v| {
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm < 1e-3 {
                return None;
            }
            for val in &mut v {
                *val /= norm;
            }
            Some(v)
        },
    )
}

/// Build uniquely named chunks for a list of embeddings.
fn chunks_for(embeddings: &[Vec<f32>]) -> Vec<Chunk> {
    (0..embeddings.len())
        .map(|i| common::chunk(&format!("doc_p1_c{i}"), &format!("chunk {i}"), FeatureSet::default()))
        .collect()
}

async fn populated(embeddings: &[Vec<f32>]) -> InMemoryVectorIndex {
    let index = InMemoryVectorIndex::new();
    index.add(chunks_for(embeddings), embeddings.to_vec()).await.unwrap();
    index
}

/// **Property: similarity search ordering**
/// *For any* set of embedded chunks, similarity search returns results ordered
/// by descending cosine similarity, and exactly `min(k, len)` of them.
mod prop_similarity_ordering {
    use super::*;

    const DIM: usize = 16;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn results_ordered_descending_and_bounded_by_k(
            embeddings in proptest::collection::vec(arb_normalized_embedding(DIM), 1..20),
            query in arb_normalized_embedding(DIM),
            k in 1usize..25,
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let results = rt.block_on(async {
                populated(&embeddings).await.similarity_search(&query, k, SearchMode::Similarity).await.unwrap()
            });

            prop_assert_eq!(results.len(), k.min(embeddings.len()));
            for window in results.windows(2) {
                prop_assert!(
                    window[0].score >= window[1].score,
                    "results not in descending order: {} < {}",
                    window[0].score,
                    window[1].score,
                );
            }
        }
    }
}

/// **Property: MMR selection**
/// *For any* index, MMR returns `min(k, len)` distinct chunks drawn from the
/// `fetch_k` most similar entries, starting with the single most similar one.
mod prop_mmr_selection {
    use super::*;

    const DIM: usize = 8;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn mmr_selects_distinct_candidates_from_fetch_pool(
            embeddings in proptest::collection::vec(arb_normalized_embedding(DIM), 1..30),
            query in arb_normalized_embedding(DIM),
            k in 1usize..10,
            extra in 0usize..10,
            lambda in 0.0f32..=1.0,
        ) {
            let fetch_k = k + extra;
            let rt = tokio::runtime::Runtime::new().unwrap();
            let (mmr, pool) = rt.block_on(async {
                let index = populated(&embeddings).await;
                let mmr = index
                    .similarity_search(&query, k, SearchMode::Mmr { fetch_k, lambda })
                    .await
                    .unwrap();
                let pool = index.similarity_search(&query, fetch_k, SearchMode::Similarity).await.unwrap();
                (mmr, pool)
            });

            prop_assert_eq!(mmr.len(), k.min(embeddings.len()));
            let ids: HashSet<&str> = mmr.iter().map(|r| r.chunk.source_id.as_str()).collect();
            prop_assert_eq!(ids.len(), mmr.len());

            let pool_ids: HashSet<&str> = pool.iter().map(|r| r.chunk.source_id.as_str()).collect();
            prop_assert!(ids.is_subset(&pool_ids));
            prop_assert_eq!(&mmr[0].chunk.source_id, &pool[0].chunk.source_id);
        }
    }
}

#[tokio::test]
async fn persisted_index_answers_identically() {
    let embeddings = vec![vec![1.0, 0.0, 0.0], vec![0.6, 0.8, 0.0], vec![0.0, 0.0, 1.0]];
    let index = populated(&embeddings).await;
    let dir = tempfile::tempdir().unwrap();
    index.persist(dir.path()).await.unwrap();
    let loaded = InMemoryVectorIndex::load(dir.path()).await.unwrap();

    let query = [0.9, 0.3, 0.1];
    let before = index.similarity_search(&query, 3, SearchMode::default()).await.unwrap();
    let after = loaded.similarity_search(&query, 3, SearchMode::default()).await.unwrap();
    let ids = |r: &[vrag_core::SearchResult]| r.iter().map(|h| h.chunk.source_id.clone()).collect::<Vec<_>>();
    assert_eq!(ids(&before), ids(&after));
    assert_eq!(*before[0].chunk, *after[0].chunk);
}
