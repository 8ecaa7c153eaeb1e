//! Part-of-speech and entity tagging.
//!
//! [`Tagger`] is the seam for the language model behind feature extraction.
//! [`RuleBasedTagger`] is a deterministic English tagger built from
//! closed-class lexicons and suffix heuristics; it needs no model files.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::lexicon::{
    ABBREVIATIONS, ADJECTIVE_SUFFIXES, ADPOSITIONS, ADVERBS, AUXILIARIES, COMMON_ADJECTIVES,
    COMMON_VERBS, CONJUNCTIONS, CURRENCY_WORDS, DETERMINERS, HONORIFICS, IRREGULAR_VERBS,
    LOCATIVE_PREPOSITIONS, MONTHS_AND_DAYS, ORG_WORDS, PARTICLES, PERSONAL_PRONOUNS, PRONOUNS,
    STOP_WORDS, VERB_SUFFIXES,
};

/// Coarse universal part-of-speech tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartOfSpeech {
    Noun,
    ProperNoun,
    Verb,
    Auxiliary,
    Adjective,
    Adverb,
    Determiner,
    Pronoun,
    Adposition,
    Conjunction,
    Particle,
    Numeral,
    Punctuation,
}

/// A tagged token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub text: String,
    pub pos: PartOfSpeech,
    pub is_stop: bool,
    pub is_alpha: bool,
}

/// A named-entity span with its type label (`PERSON`, `ORG`, `GPE`, …).
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySpan {
    pub text: String,
    pub label: String,
}

/// Everything a [`Tagger`] knows about one text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Analysis {
    pub tokens: Vec<Token>,
    pub entities: Vec<EntitySpan>,
    pub noun_chunks: Vec<String>,
    /// Sentences in document order.
    pub sentences: Vec<String>,
}

/// A part-of-speech and entity-recognition model.
///
/// Implementations must be deterministic for a fixed input.
pub trait Tagger: Send + Sync {
    /// Tokenize, tag, and segment `text`.
    fn analyze(&self, text: &str) -> Analysis;
}

/// Rule-based English tagger.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedTagger;

impl Tagger for RuleBasedTagger {
    fn analyze(&self, text: &str) -> Analysis {
        let mut analysis = Analysis::default();

        for sentence in split_sentences(text) {
            let words = tokenize(&sentence);
            let tags = tag_words(&words);

            analysis.entities.extend(extract_entities(&words, &tags));
            analysis.noun_chunks.extend(extract_noun_chunks(&words, &tags));
            analysis.tokens.extend(words.into_iter().zip(tags).map(|(text, pos)| {
                let lower = text.to_lowercase();
                Token {
                    is_stop: STOP_WORDS.contains(lower.as_str()),
                    is_alpha: !text.is_empty() && text.chars().all(char::is_alphabetic),
                    text,
                    pos,
                }
            }));
            analysis.sentences.push(sentence);
        }

        analysis
    }
}

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$?\d+(?:[.,:/]\d+)*%?|\p{L}+(?:['’\-]\p{L}+)*|\S")
        .expect("token regex is valid")
});

static PARAGRAPH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("paragraph regex is valid"));

const CONTRACTIONS: &[&str] = &["n't", "'s", "’s", "'re", "'ll", "'ve", "'d", "'m"];

/// Split text into word, number, and punctuation tokens; contractions are
/// separated from their stem (`don't` → `do`, `n't`).
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for m in TOKEN_RE.find_iter(text) {
        let word = m.as_str();
        let lower = word.to_lowercase();
        let split = CONTRACTIONS.iter().find_map(|suffix| {
            let stem_len = lower.len().checked_sub(suffix.len())?;
            (stem_len > 0 && lower.ends_with(suffix) && word.is_char_boundary(stem_len))
                .then_some(stem_len)
        });
        match split {
            Some(at) => {
                tokens.push(word[..at].to_string());
                tokens.push(word[at..].to_string());
            }
            None => tokens.push(word.to_string()),
        }
    }
    tokens
}

/// Split text into trimmed sentences.
///
/// Boundaries are blank lines and terminal punctuation followed by whitespace,
/// unless the period closes a known abbreviation or a single initial, or the
/// next word starts in lower case.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();

    for paragraph in PARAGRAPH_RE.split(text) {
        let chars: Vec<(usize, char)> = paragraph.char_indices().collect();
        let mut start = 0;
        let mut i = 0;

        while i < chars.len() {
            let (at, c) = chars[i];
            if !matches!(c, '.' | '!' | '?') {
                i += 1;
                continue;
            }

            let mut j = i + 1;
            while j < chars.len() && matches!(chars[j].1, '.' | '!' | '?' | '"' | '\'' | ')' | ']' | '”' | '’') {
                j += 1;
            }
            let end = chars.get(j).map(|(pos, _)| *pos).unwrap_or(paragraph.len());
            let followed_by_space = chars.get(j).is_none_or(|(_, next)| next.is_whitespace());

            if followed_by_space && is_boundary(&paragraph[start..at], c, &paragraph[end..]) {
                let sentence = paragraph[start..end].trim();
                if !sentence.is_empty() {
                    sentences.push(sentence.to_string());
                }
                start = end;
            }
            i = j;
        }

        let rest = paragraph[start..].trim();
        if !rest.is_empty() {
            sentences.push(rest.to_string());
        }
    }

    sentences
}

fn is_boundary(before: &str, terminal: char, after: &str) -> bool {
    if terminal == '.' {
        let last_word = before
            .split_whitespace()
            .last()
            .unwrap_or_default()
            .trim_start_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        let single_initial = last_word.chars().count() == 1
            && last_word.chars().all(char::is_alphabetic)
            && before.split_whitespace().last().is_some_and(|w| w.chars().all(char::is_uppercase));
        if ABBREVIATIONS.contains(last_word.as_str()) || single_initial {
            return false;
        }
    }
    !after.trim_start().starts_with(|c: char| c.is_lowercase())
}

fn is_capitalized(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}

fn is_acronym(word: &str) -> bool {
    word.chars().count() >= 2 && word.chars().all(|c| c.is_ascii_uppercase())
}

fn is_base_verb(lower: &str) -> bool {
    COMMON_VERBS.contains(lower)
}

/// Whether `lower` is a base, inflected, or irregular form of a known verb.
fn is_verb_form(lower: &str) -> bool {
    if IRREGULAR_VERBS.contains(lower) || COMMON_VERBS.contains(lower) {
        return true;
    }
    ["ing", "ed", "es", "s", "d"].iter().any(|suffix| {
        let Some(stem) = lower.strip_suffix(suffix) else {
            return false;
        };
        if stem.len() < 2 {
            return false;
        }
        if COMMON_VERBS.contains(stem) || COMMON_VERBS.contains(format!("{stem}e").as_str()) {
            return true;
        }
        // stopped → stop, studied → study
        let mut chars = stem.char_indices().rev();
        let undoubled = match (chars.next(), chars.next()) {
            (Some((last, a)), Some((_, b))) if a == b => Some(&stem[..last]),
            _ => None,
        };
        undoubled.is_some_and(|s| COMMON_VERBS.contains(s))
            || stem
                .strip_suffix('i')
                .is_some_and(|s| COMMON_VERBS.contains(format!("{s}y").as_str()))
    })
}

fn classify(
    word: &str,
    position: usize,
    prev: Option<(&str, PartOfSpeech)>,
    next: Option<&str>,
) -> PartOfSpeech {
    use PartOfSpeech::*;

    if !word.chars().any(char::is_alphanumeric) {
        return Punctuation;
    }
    if word.starts_with(|c: char| c.is_ascii_digit() || c == '$') {
        return Numeral;
    }

    let lower = word.to_lowercase();
    let l = lower.as_str();

    if PARTICLES.contains(l) {
        return Particle;
    }
    if l == "to" && next.is_some_and(|n| is_base_verb(&n.to_lowercase())) {
        return Particle;
    }
    if is_acronym(word) || (HONORIFICS.contains(l) && is_capitalized(word)) {
        return ProperNoun;
    }
    if MONTHS_AND_DAYS.contains(l) && is_capitalized(word) {
        return Noun;
    }
    if l != "i" && is_capitalized(word) {
        let sentence_initial_name =
            position == 0 && next.is_some_and(|n| is_capitalized(n) && n.len() > 1);
        let closed_class = DETERMINERS.contains(l)
            || PRONOUNS.contains(l)
            || AUXILIARIES.contains(l)
            || ADPOSITIONS.contains(l)
            || CONJUNCTIONS.contains(l)
            || ADVERBS.contains(l);
        if !closed_class && (position > 0 || sentence_initial_name) {
            return ProperNoun;
        }
    }
    if DETERMINERS.contains(l) {
        return Determiner;
    }
    if PRONOUNS.contains(l) {
        return Pronoun;
    }
    if AUXILIARIES.contains(l) {
        return Auxiliary;
    }
    if ADPOSITIONS.contains(l) {
        return Adposition;
    }
    if CONJUNCTIONS.contains(l) {
        return Conjunction;
    }
    if ADVERBS.contains(l) {
        return Adverb;
    }
    if is_verb_form(l) {
        return Verb;
    }
    if COMMON_ADJECTIVES.contains(l) {
        return Adjective;
    }
    let after_verbal = prev.is_some_and(|(p, pos)| {
        matches!(pos, Auxiliary | Particle) || PERSONAL_PRONOUNS.contains(p.to_lowercase().as_str())
    });
    if after_verbal && (l.ends_with("ed") || l.ends_with("ing")) && l.len() > 4 {
        return Verb;
    }
    if l.len() > 4 && l.ends_with("ly") {
        return Adverb;
    }
    if ADJECTIVE_SUFFIXES.iter().any(|s| l.len() > s.len() + 2 && l.ends_with(s)) {
        return Adjective;
    }
    if VERB_SUFFIXES.iter().any(|s| l.len() > 5 && l.ends_with(s)) {
        return Verb;
    }
    Noun
}

fn tag_words(words: &[String]) -> Vec<PartOfSpeech> {
    let mut tags: Vec<PartOfSpeech> = Vec::with_capacity(words.len());
    for (i, word) in words.iter().enumerate() {
        let prev = i.checked_sub(1).map(|p| (words[p].as_str(), tags[p]));
        let next = words.get(i + 1).map(String::as_str);
        tags.push(classify(word, i, prev, next));
    }
    tags
}

fn numeric_label(word: &str, next: Option<&str>) -> (&'static str, bool) {
    let next_lower = next.map(str::to_lowercase).unwrap_or_default();
    if word.ends_with('%') {
        return ("PERCENT", false);
    }
    if next_lower == "percent" {
        return ("PERCENT", true);
    }
    if word.starts_with('$') {
        return ("MONEY", false);
    }
    if CURRENCY_WORDS.contains(next_lower.as_str()) {
        return ("MONEY", true);
    }
    let is_year = word.len() == 4
        && word.parse::<u32>().is_ok_and(|year| (1000..=2100).contains(&year));
    if is_year { ("DATE", false) } else { ("CARDINAL", false) }
}

fn proper_label(span: &[String], prev: Option<&str>) -> &'static str {
    let lowered: Vec<String> = span.iter().map(|w| w.to_lowercase()).collect();
    if lowered.iter().any(|w| ORG_WORDS.contains(w.as_str()))
        || (span.len() == 1 && is_acronym(&span[0]))
    {
        return "ORG";
    }
    if prev.is_some_and(|p| LOCATIVE_PREPOSITIONS.contains(p.to_lowercase().as_str())) {
        return "GPE";
    }
    if span.len() >= 2 { "PERSON" } else { "MISC" }
}

fn extract_entities(words: &[String], tags: &[PartOfSpeech]) -> Vec<EntitySpan> {
    let mut entities = Vec::new();
    let mut after_honorific = false;
    let mut i = 0;

    while i < words.len() {
        let word = &words[i];
        let lower = word.to_lowercase();

        if tags[i] == PartOfSpeech::Numeral {
            let (label, consumes_unit) = numeric_label(word, words.get(i + 1).map(String::as_str));
            let end = if consumes_unit { i + 2 } else { i + 1 };
            entities.push(EntitySpan { text: words[i..end].join(" "), label: label.into() });
            i = end;
            continue;
        }

        if MONTHS_AND_DAYS.contains(lower.as_str()) && is_capitalized(word) {
            let mut j = i + 1;
            loop {
                if j < words.len() && tags[j] == PartOfSpeech::Numeral {
                    j += 1;
                } else if j + 1 < words.len()
                    && words[j] == ","
                    && tags[j + 1] == PartOfSpeech::Numeral
                {
                    j += 2;
                } else {
                    break;
                }
            }
            let text = words[i..j].iter().filter(|w| *w != ",").cloned().collect::<Vec<_>>();
            entities.push(EntitySpan { text: text.join(" "), label: "DATE".into() });
            i = j;
            continue;
        }

        if tags[i] != PartOfSpeech::ProperNoun {
            after_honorific = after_honorific && word == ".";
            i += 1;
            continue;
        }

        let mut j = i + 1;
        while j < words.len() {
            let bridge = matches!(words[j].as_str(), "of" | "&" | "de")
                && tags.get(j + 1) == Some(&PartOfSpeech::ProperNoun);
            if tags[j] == PartOfSpeech::ProperNoun {
                j += 1;
            } else if bridge {
                j += 2;
            } else {
                break;
            }
        }

        let mut span = &words[i..j];
        let starts_with_honorific =
            HONORIFICS.contains(span[0].to_lowercase().trim_end_matches('.'));
        if starts_with_honorific {
            span = &span[1..];
        }

        if span.is_empty() {
            after_honorific = true;
        } else {
            let label = if after_honorific || starts_with_honorific {
                "PERSON"
            } else {
                proper_label(span, i.checked_sub(1).map(|p| words[p].as_str()))
            };
            entities.push(EntitySpan { text: span.join(" "), label: label.into() });
            after_honorific = false;
        }
        i = j;
    }

    entities
}

fn extract_noun_chunks(words: &[String], tags: &[PartOfSpeech]) -> Vec<String> {
    use PartOfSpeech::*;

    let mut chunks = Vec::new();
    let mut i = 0;

    while i < words.len() {
        if tags[i] == Pronoun && PERSONAL_PRONOUNS.contains(words[i].to_lowercase().as_str()) {
            chunks.push(words[i].clone());
            i += 1;
            continue;
        }
        if !matches!(tags[i], Determiner | Adjective | Numeral | Noun | ProperNoun) {
            i += 1;
            continue;
        }

        let mut j = i;
        if tags[j] == Determiner {
            j += 1;
        }
        while j < words.len() && matches!(tags[j], Adjective | Numeral | Noun | ProperNoun) {
            j += 1;
        }

        match (i..j).rev().find(|&k| matches!(tags[k], Noun | ProperNoun)) {
            Some(head) => {
                chunks.push(words[i..=head].join(" "));
                i = head + 1;
            }
            None => i = j.max(i + 1),
        }
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos_of(analysis: &Analysis, word: &str) -> PartOfSpeech {
        analysis.tokens.iter().find(|t| t.text == word).map(|t| t.pos).unwrap()
    }

    #[test]
    fn splits_sentences_but_not_abbreviations() {
        let sentences =
            split_sentences("Dr. Smith arrived at 9 a.m. today. He left early! Did he return?");
        assert_eq!(
            sentences,
            vec!["Dr. Smith arrived at 9 a.m. today.", "He left early!", "Did he return?"]
        );
    }

    #[test]
    fn splits_on_blank_lines() {
        let sentences = split_sentences("Heading\n\nFirst paragraph here.");
        assert_eq!(sentences, vec!["Heading", "First paragraph here."]);
    }

    #[test]
    fn separates_contractions() {
        assert_eq!(tokenize("don't stop"), vec!["do", "n't", "stop"]);
        assert_eq!(tokenize("France's capital."), vec!["France", "'s", "capital", "."]);
    }

    #[test]
    fn tags_simple_question() {
        let analysis = RuleBasedTagger.analyze("What is the capital of France?");
        assert_eq!(pos_of(&analysis, "capital"), PartOfSpeech::Noun);
        assert_eq!(pos_of(&analysis, "France"), PartOfSpeech::ProperNoun);
        assert_eq!(pos_of(&analysis, "is"), PartOfSpeech::Auxiliary);
        assert_eq!(
            analysis.entities,
            vec![EntitySpan { text: "France".into(), label: "GPE".into() }]
        );
        assert_eq!(analysis.noun_chunks, vec!["the capital".to_string(), "France".into()]);
    }

    #[test]
    fn labels_numbers_dates_and_organisations() {
        let analysis = RuleBasedTagger
            .analyze("In March 1998 the Acme Corporation paid $40 and kept 12% of 300 shares.");
        let labelled: Vec<(&str, &str)> =
            analysis.entities.iter().map(|e| (e.text.as_str(), e.label.as_str())).collect();
        assert!(labelled.contains(&("March 1998", "DATE")));
        assert!(labelled.contains(&("Acme Corporation", "ORG")));
        assert!(labelled.contains(&("$40", "MONEY")));
        assert!(labelled.contains(&("12%", "PERCENT")));
        assert!(labelled.contains(&("300", "CARDINAL")));
    }

    #[test]
    fn honorific_marks_person() {
        let analysis = RuleBasedTagger.analyze("The award went to Dr. Ada Lovelace last year.");
        assert!(
            analysis
                .entities
                .iter()
                .any(|e| e.text == "Ada Lovelace" && e.label == "PERSON")
        );
    }

    #[test]
    fn verbs_and_adjectives_by_form() {
        let analysis = RuleBasedTagger.analyze("The researchers discovered a radioactive element.");
        assert_eq!(pos_of(&analysis, "discovered"), PartOfSpeech::Verb);
        assert_eq!(pos_of(&analysis, "radioactive"), PartOfSpeech::Adjective);
        assert_eq!(pos_of(&analysis, "element"), PartOfSpeech::Noun);
        assert!(analysis.noun_chunks.contains(&"a radioactive element".to_string()));
    }

    #[test]
    fn doubled_final_letters_strip_by_character() {
        assert!(is_verb_form("stopped"));
        assert!(is_verb_form("running"));
        assert!(!is_verb_form("créées"));
        assert!(!is_verb_form("ééés"));
        assert!(!is_verb_form("żżing"));
    }

    #[test]
    fn non_ascii_inflections_are_tagged() {
        for text in [
            "Les données sont créées ici.",
            "Quelles entrées ont été créées ?",
            "Die Bäume wüchsen schnell, öööed über Flüsse.",
        ] {
            let analysis = RuleBasedTagger.analyze(text);
            assert!(!analysis.tokens.is_empty());
            assert_eq!(analysis.sentences.len(), 1);
        }
    }
}
