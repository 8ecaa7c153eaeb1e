//! Integration tests for semantic chunking and feature enrichment.

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use common::{FailingEmbedder, HashEmbedder};
use proptest::prelude::*;
use vrag_core::{BreakpointThreshold, Document, RagError, SemanticChunker};

/// ASCII words, arbitrary Unicode letters, and inflections of a doubled letter.
fn arb_word() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{2,9}",
        "\\p{L}{2,9}",
        (
            any::<char>().prop_filter("letter", |c| c.is_alphabetic()),
            prop_oneof![Just("es"), Just("ed"), Just("ing")],
        )
            .prop_map(|(c, suffix)| format!("cr{c}{c}{suffix}")),
    ]
}

fn arb_sentence() -> impl Strategy<Value = String> {
    (proptest::collection::vec(arb_word(), 2..8), prop_oneof![Just('.'), Just('?'), Just('!')]).prop_map(
        |(words, end)| {
            let mut sentence = words.join(" ");
            if let Some(first) = sentence.get_mut(0..1) {
                first.make_ascii_uppercase();
            }
            sentence.push(end);
            sentence
        },
    )
}

fn arb_threshold() -> impl Strategy<Value = BreakpointThreshold> {
    prop_oneof![
        (1.0f32..=100.0).prop_map(BreakpointThreshold::Percentile),
        (0.0f32..4.0).prop_map(BreakpointThreshold::StandardDeviation),
        (0.0f32..3.0).prop_map(BreakpointThreshold::Interquartile),
    ]
}

/// **Property: chunking loses no sentence**
/// *For any* document, concatenating its chunks in `chunk_index` order yields
/// every original sentence, in order, under every threshold strategy.
mod prop_chunks_cover_sentences {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn concatenated_chunks_contain_every_sentence(
            sentences in proptest::collection::vec(arb_sentence(), 1..15),
            threshold in arb_threshold(),
        ) {
            let document = Document::new("prop.txt", 1, sentences.join(" "));
            let chunker = SemanticChunker::new(Arc::new(HashEmbedder::new(32))).with_threshold(threshold);

            let rt = tokio::runtime::Runtime::new().unwrap();
            let chunks = rt.block_on(chunker.chunk_document(&document)).unwrap();

            prop_assert!(!chunks.is_empty());
            prop_assert!(chunks.len() <= sentences.len());
            let joined = chunks.iter().map(|c| c.text.as_str()).collect::<Vec<_>>().join(" ");
            prop_assert_eq!(joined, sentences.join(" "));

            let ids: HashSet<&str> = chunks.iter().map(|c| c.source_id.as_str()).collect();
            prop_assert_eq!(ids.len(), chunks.len());
            for (i, chunk) in chunks.iter().enumerate() {
                prop_assert_eq!(chunk.chunk_index, i);
                prop_assert_eq!(chunk.total_chunks, chunks.len());
                prop_assert_eq!(chunk.length, chunk.text.chars().count());
            }
        }
    }
}

#[tokio::test]
async fn chunks_carry_linguistic_features() {
    let document = Document::new(
        "france.txt",
        2,
        "Paris is the capital of France. The city hosts the Louvre museum.",
    );
    let chunker = SemanticChunker::new(Arc::new(HashEmbedder::new(64)))
        .with_threshold(BreakpointThreshold::Percentile(100.0));
    let chunks = chunker.chunk_document(&document).await.unwrap();

    assert_eq!(chunks.len(), 1);
    let chunk = &chunks[0];
    assert_eq!(chunk.source_id, "france.txt_p2_c0");
    assert!(chunk.features.entities.contains(&"france".to_string()));
    assert!(chunk.features.nouns.contains(&"capital".to_string()));
    assert_eq!(chunk.features.sentences.len(), 2);
    assert!(chunk.features.word_count > 0);
}

#[tokio::test]
async fn one_failing_document_does_not_stop_the_batch() {
    let documents = vec![
        Document::new("a.txt", 1, "A lone sentence."),
        Document::new("b.txt", 1, "Two sentences here. They need embeddings."),
        Document::new("c.txt", 1, ""),
    ];
    let batch = SemanticChunker::new(Arc::new(FailingEmbedder)).chunk(&documents).await;

    assert_eq!(batch.chunks.len(), 1);
    assert_eq!(batch.chunks[0].source_id, "a.txt_p1_c0");
    assert_eq!(batch.failures.len(), 1);
    assert!(matches!(batch.failures[0], RagError::ChunkingFailure { .. }));
}

#[tokio::test]
async fn accented_inflections_do_not_abort_the_batch() {
    let documents = vec![
        Document::new("fr.txt", 1, "Les données sont créées ici. Elles furent stoppées hier."),
        Document::new("en.txt", 1, "Paris is the capital of France."),
    ];
    let batch = SemanticChunker::new(Arc::new(HashEmbedder::new(32))).chunk(&documents).await;

    assert!(batch.failures.is_empty());
    let french: Vec<_> = batch.chunks.iter().filter(|c| c.source_id.starts_with("fr.txt_p1_")).collect();
    assert!(!french.is_empty());
    assert!(french.iter().all(|c| c.features.word_count > 0));
}
