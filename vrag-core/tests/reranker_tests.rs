//! Integration tests for hybrid reranking.

mod common;

use std::sync::Arc;

use common::{CapitalisedEntityTagger, TableEmbedder, chunk, terms};
use proptest::prelude::*;
use vrag_core::linguistic::FeatureSet;
use vrag_core::{FeatureExtractor, FeatureOverlapReranker, Reranker, SearchResult};

const QUESTION: &str = "compare Alpha with Beta";

fn result(id: &str, text: &str, features: FeatureSet) -> SearchResult {
    SearchResult { chunk: Arc::new(chunk(id, text, features)), score: 0.0 }
}

fn reranker(embedder: TableEmbedder) -> FeatureOverlapReranker {
    FeatureOverlapReranker::new(Arc::new(embedder))
        .with_extractor(FeatureExtractor::new(Arc::new(CapitalisedEntityTagger)))
}

#[tokio::test]
async fn entity_matches_lift_a_less_similar_chunk() {
    let b_y = (1.0f32 - 0.55 * 0.55).sqrt();
    let embedder = TableEmbedder::new(
        [
            (QUESTION, vec![1.0, 0.0]),
            ("chunk a", vec![0.6, 0.8]),
            ("chunk b", vec![0.55, b_y]),
        ],
        vec![0.0, 1.0],
    );
    let a_features = FeatureSet { entities: terms(&["alpha", "beta"]), ..FeatureSet::default() };
    let candidates = vec![
        result("b", "chunk b", FeatureSet::default()),
        result("a", "chunk a", a_features),
    ];

    let scored = reranker(embedder).rerank(QUESTION, candidates).await.unwrap();

    let ids: Vec<&str> = scored.iter().map(|s| s.chunk.source_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert!((scored[0].similarity - 0.6).abs() < 1e-5);
    assert!((scored[0].adjusted_score - 0.8).abs() < 1e-5);
    assert!((scored[1].adjusted_score - 0.55).abs() < 1e-5);
}

#[tokio::test]
async fn restated_terms_count_once() {
    let embedder = TableEmbedder::constant(vec![1.0, 0.0]);
    let features = FeatureSet { entities: terms(&["alpha"]), ..FeatureSet::default() };
    let scored = reranker(embedder)
        .rerank("Alpha and Alpha and Alpha", vec![result("a", "chunk a", features)])
        .await
        .unwrap();
    assert!((scored[0].adjusted_score - scored[0].similarity - 0.10).abs() < 1e-5);
}

#[tokio::test]
async fn equal_scores_keep_retrieval_order() {
    let embedder = TableEmbedder::constant(vec![1.0, 0.0]);
    let candidates =
        (0..4).map(|i| result(&format!("c{i}"), &format!("text {i}"), FeatureSet::default())).collect();
    let scored = reranker(embedder).rerank("plain question", candidates).await.unwrap();
    let ids: Vec<&str> = scored.iter().map(|s| s.chunk.source_id.as_str()).collect();
    assert_eq!(ids, vec!["c0", "c1", "c2", "c3"]);
}

#[tokio::test]
async fn no_candidates_means_no_embedding() {
    let embedder = Arc::new(TableEmbedder::constant(vec![1.0]));
    let reranker = FeatureOverlapReranker::new(embedder.clone());
    assert!(reranker.rerank("anything", Vec::new()).await.unwrap().is_empty());
    assert_eq!(embedder.call_count(), 0);
}

#[tokio::test]
async fn accented_questions_are_reranked() {
    let embedder = Arc::new(TableEmbedder::constant(vec![1.0, 0.0]));
    let reranker = FeatureOverlapReranker::new(embedder);
    let candidates = vec![
        result("fr", "Les entrées ont été créées en mars.", FeatureSet::default()),
        result("de", "Die Bäume wüchsen schnell.", FeatureSet::default()),
    ];

    let scored = reranker.rerank("Quelles entrées ont été créées ?", candidates).await.unwrap();

    assert_eq!(scored.len(), 2);
    assert!(scored.iter().all(|s| s.adjusted_score >= s.similarity));
}

fn arb_terms() -> impl Strategy<Value = Vec<&'static str>> {
    proptest::collection::vec(prop_oneof![Just("alpha"), Just("beta"), Just("gamma"), Just("delta")], 0..4)
}

fn arb_features() -> impl Strategy<Value = FeatureSet> {
    (arb_terms(), arb_terms(), arb_terms()).prop_map(|(nouns, entities, chunks)| FeatureSet {
        nouns: terms(&nouns),
        entities: terms(&entities),
        noun_chunks: terms(&chunks),
        ..FeatureSet::default()
    })
}

/// **Property: boosts never lower a score**
/// *For any* candidates, every adjusted score is at least its similarity and
/// results are sorted by descending adjusted score.
mod prop_adjusted_score_bounds {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn adjusted_at_least_similarity(
            features in proptest::collection::vec(arb_features(), 1..8),
            vectors in proptest::collection::vec(proptest::collection::vec(-1.0f32..1.0, 3), 8),
        ) {
            let texts: Vec<String> = (0..features.len()).map(|i| format!("chunk {i}")).collect();
            let entries = texts.iter().map(String::as_str).zip(vectors.iter().cloned());
            let embedder = TableEmbedder::new(entries, vec![0.3, -0.2, 0.9]);
            let candidates: Vec<SearchResult> = features
                .into_iter()
                .enumerate()
                .map(|(i, f)| result(&format!("c{i}"), &texts[i], f))
                .collect();

            let rt = tokio::runtime::Runtime::new().unwrap();
            let scored = rt
                .block_on(reranker(embedder).rerank("Alpha meets Gamma", candidates))
                .unwrap();

            for s in &scored {
                prop_assert!(s.adjusted_score >= s.similarity);
            }
            for pair in scored.windows(2) {
                prop_assert!(pair[0].adjusted_score >= pair[1].adjusted_score);
            }
        }
    }
}
