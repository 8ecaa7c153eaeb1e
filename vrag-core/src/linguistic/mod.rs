//! Linguistic feature extraction.
//!
//! [`FeatureExtractor`] turns raw text into a [`FeatureSet`]: entity surface
//! forms and labels, content-word sets, noun phrases, sentences, and a word
//! count. The heavy lifting is delegated to a [`Tagger`]; this module owns the
//! normalisation rules that make features comparable between a question and
//! a chunk.

mod lexicon;
pub mod tagger;

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use tagger::{Analysis, EntitySpan, PartOfSpeech, RuleBasedTagger, Tagger, Token};

/// Characters stripped from both ends of a normalised term.
const TRIM_CHARS: &[char] = &['.', ',', ':', ';', '!', '?', '(', ')', '[', ']', '{', '}'];

/// Structured lexical and entity features of a text.
///
/// Every set-valued field is deduplicated and sorted. `sentences` keeps
/// document order and duplicates.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FeatureSet {
    pub entities: Vec<String>,
    pub entity_labels: Vec<String>,
    pub nouns: Vec<String>,
    pub verbs: Vec<String>,
    pub adjectives: Vec<String>,
    pub noun_chunks: Vec<String>,
    pub sentences: Vec<String>,
    /// Number of alphabetic tokens.
    pub word_count: usize,
}

/// Normalise raw surface forms into a sorted, deduplicated term list.
///
/// Forms of one character are dropped before normalisation; the rest are
/// lower-cased and stripped of [`TRIM_CHARS`]. Forms that normalise to the
/// empty string are dropped.
pub fn normalize_terms<I, S>(forms: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    forms
        .into_iter()
        .filter(|form| form.as_ref().chars().count() > 1)
        .map(|form| form.as_ref().to_lowercase().trim_matches(TRIM_CHARS).to_string())
        .filter(|term| !term.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Extracts [`FeatureSet`]s using a pluggable [`Tagger`].
///
/// # Example
///
/// ```rust
/// use vrag_core::FeatureExtractor;
///
/// let features = FeatureExtractor::default().extract("What is the capital of France?");
/// assert_eq!(features.entities, vec!["france"]);
/// assert!(features.nouns.contains(&"capital".to_string()));
/// ```
#[derive(Clone)]
pub struct FeatureExtractor {
    tagger: Arc<dyn Tagger>,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(Arc::new(RuleBasedTagger))
    }
}

impl std::fmt::Debug for FeatureExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureExtractor").finish_non_exhaustive()
    }
}

impl FeatureExtractor {
    /// Create an extractor backed by the given tagger.
    pub fn new(tagger: Arc<dyn Tagger>) -> Self {
        Self { tagger }
    }

    /// Extract features from `text`. Empty text yields an empty [`FeatureSet`].
    pub fn extract(&self, text: &str) -> FeatureSet {
        if text.trim().is_empty() {
            return FeatureSet::default();
        }

        let analysis = self.tagger.analyze(text);
        let tokens_where = |pos: PartOfSpeech, skip_stop: bool| {
            analysis
                .tokens
                .iter()
                .filter(move |t| t.pos == pos && !(skip_stop && t.is_stop))
                .map(|t| t.text.as_str())
        };

        FeatureSet {
            entities: normalize_terms(analysis.entities.iter().map(|e| e.text.as_str())),
            entity_labels: analysis
                .entities
                .iter()
                .map(|e| e.label.clone())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
            nouns: normalize_terms(tokens_where(PartOfSpeech::Noun, true)),
            verbs: normalize_terms(tokens_where(PartOfSpeech::Verb, true)),
            adjectives: normalize_terms(tokens_where(PartOfSpeech::Adjective, false)),
            noun_chunks: normalize_terms(&analysis.noun_chunks),
            sentences: analysis
                .sentences
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            word_count: analysis.tokens.iter().filter(|t| t.is_alpha).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_yields_empty_features() {
        let features = FeatureExtractor::default().extract("");
        assert_eq!(features, FeatureSet::default());
        assert_eq!(features.word_count, 0);
    }

    #[test]
    fn normalisation_lowercases_trims_and_dedupes() {
        let terms = normalize_terms(["Paris", "paris.", "(Rome)", "a", "Lyon", "Rome"]);
        assert_eq!(terms, vec!["lyon", "paris", "rome"]);
    }

    #[test]
    fn normalisation_filters_length_before_trimming() {
        assert_eq!(normalize_terms(["x.", "()"]), vec!["x"]);
    }

    #[test]
    fn stop_words_excluded_from_nouns_but_not_adjectives() {
        struct Fixed;
        impl Tagger for Fixed {
            fn analyze(&self, _text: &str) -> Analysis {
                let token = |text: &str, pos, is_stop| Token {
                    text: text.into(),
                    pos,
                    is_stop,
                    is_alpha: true,
                };
                Analysis {
                    tokens: vec![
                        token("part", PartOfSpeech::Noun, true),
                        token("engine", PartOfSpeech::Noun, false),
                        token("whole", PartOfSpeech::Adjective, true),
                        token("made", PartOfSpeech::Verb, true),
                        token("runs", PartOfSpeech::Verb, false),
                    ],
                    entities: vec![],
                    noun_chunks: vec!["the engine".into()],
                    sentences: vec![" The whole engine runs. ".into()],
                }
            }
        }

        let features = FeatureExtractor::new(Arc::new(Fixed)).extract("anything");
        assert_eq!(features.nouns, vec!["engine"]);
        assert_eq!(features.verbs, vec!["runs"]);
        assert_eq!(features.adjectives, vec!["whole"]);
        assert_eq!(features.noun_chunks, vec!["the engine"]);
        assert_eq!(features.sentences, vec!["The whole engine runs."]);
        assert_eq!(features.word_count, 5);
    }

    #[test]
    fn sentences_keep_order_and_duplicates() {
        let features = FeatureExtractor::default().extract("It works. It works. Done now.");
        assert_eq!(features.sentences, vec!["It works.", "It works.", "Done now."]);
    }

    #[test]
    fn counts_alphabetic_tokens_only() {
        let features = FeatureExtractor::default().extract("Revenue grew 12% in 2020, again.");
        assert_eq!(features.word_count, 4);
        assert_eq!(features.entity_labels, vec!["DATE", "PERCENT"]);
    }
}
