//! Query decomposition into independent sub-questions.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{RagError, Result};
use crate::generator::{GenerationRequest, Generator};

/// First (shortest) brace-delimited span of the generator output.
static JSON_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[\s\S]*?\}").expect("json object regex is valid"));

/// Sampling temperature for decomposition requests.
const DECOMPOSITION_TEMPERATURE: f32 = 0.0;

/// One independent question derived from the user query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubQuestion {
    /// `"Q1"`, `"Q2"`, … in generation order. Stable within one decomposition.
    pub id: String,
    pub text: String,
}

impl SubQuestion {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into() }
    }
}

fn decomposition_prompt(query: &str) -> String {
    format!(
        r#"You are a helpful assistant.

INSTRUCTIONS:
- If the query is already a complete, grammatical question, do not change it.
- Otherwise, correct grammar, spelling, and slang.
- If the query contains multiple parts or topics, split them into separate questions, even if they are grammatically joined.
- Do NOT assume or add new information.
- Return valid JSON in the format:
{{ "Q1": "question 1", "Q2": "question 2", ... }}

Only return JSON. No explanation or extra lines.

Query: {query}"#
    )
}

/// Parse generator output into sub-questions.
///
/// Takes the first `{ … }` span, which must be a non-empty JSON object of
/// strings. Sub-questions are numbered in key order.
pub fn parse_sub_questions(raw: &str) -> Result<Vec<SubQuestion>> {
    let span = JSON_OBJECT
        .find(raw)
        .ok_or_else(|| RagError::MalformedDecomposition("no JSON object in output".to_string()))?;
    let object: Map<String, Value> = serde_json::from_str(span.as_str())
        .map_err(|e| RagError::MalformedDecomposition(format!("invalid JSON: {e}")))?;
    if object.is_empty() {
        return Err(RagError::MalformedDecomposition("empty question object".to_string()));
    }

    object
        .into_iter()
        .enumerate()
        .map(|(i, (key, value))| match value {
            Value::String(text) if !text.trim().is_empty() => {
                Ok(SubQuestion::new(format!("Q{}", i + 1), text.trim()))
            }
            other => Err(RagError::MalformedDecomposition(format!(
                "value of '{key}' is not a question: {other}"
            ))),
        })
        .collect()
}

/// Rewrites a user query into one or more self-contained questions.
#[derive(Clone)]
pub struct QueryDecomposer {
    generator: Arc<dyn Generator>,
    max_tokens: u32,
}

impl std::fmt::Debug for QueryDecomposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryDecomposer").field("max_tokens", &self.max_tokens).finish_non_exhaustive()
    }
}

impl QueryDecomposer {
    pub fn new(generator: Arc<dyn Generator>, max_tokens: u32) -> Self {
        Self { generator, max_tokens }
    }

    /// Decompose `query`.
    ///
    /// # Errors
    ///
    /// [`RagError::GenerationFailure`] if the generator fails and
    /// [`RagError::MalformedDecomposition`] if its output cannot be parsed.
    pub async fn decompose(&self, query: &str) -> Result<Vec<SubQuestion>> {
        let request = GenerationRequest::prompt(
            decomposition_prompt(query),
            self.max_tokens,
            DECOMPOSITION_TEMPERATURE,
        );
        let raw = self.generator.generate(request).await?;
        let questions = parse_sub_questions(&raw)?;
        debug!(query, sub_question_count = questions.len(), "decomposed query");
        Ok(questions)
    }

    /// Like [`decompose`](Self::decompose), but malformed output falls back to
    /// a single `Q1` holding the original query.
    ///
    /// # Errors
    ///
    /// Only generator failures propagate.
    pub async fn decompose_or_single(&self, query: &str) -> Result<Vec<SubQuestion>> {
        match self.decompose(query).await {
            Err(RagError::MalformedDecomposition(reason)) => {
                warn!(query, reason = %reason, "decomposition output unusable, using the query as-is");
                Ok(vec![SubQuestion::new("Q1", query)])
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_first_object_in_key_order() {
        let raw = "Sure!\n{\"Q2\": \"Second?\", \"Q1\": \"First?\"} trailing {\"Q9\": \"x\"}";
        let questions = parse_sub_questions(raw).unwrap();
        assert_eq!(
            questions,
            vec![SubQuestion::new("Q1", "Second?"), SubQuestion::new("Q2", "First?")]
        );
    }

    #[test]
    fn rejects_missing_empty_or_non_string() {
        for raw in ["no json here", "{}", "{\"Q1\": 3}", "{\"Q1\": \"ok\",}", "{\"Q1\": \"  \"}"] {
            assert!(
                matches!(parse_sub_questions(raw), Err(RagError::MalformedDecomposition(_))),
                "{raw}"
            );
        }
    }

    #[test]
    fn prompt_embeds_query() {
        let prompt = decomposition_prompt("capital of france and germany");
        assert!(prompt.ends_with("Query: capital of france and germany"));
        assert!(prompt.contains(r#"{ "Q1": "question 1""#));
    }
}
