//! Answer validation against the assembled context.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::ContextPayload;
use crate::error::Result;
use crate::generator::{GenerationRequest, Generator};

/// The evaluator's verdict on an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Validation {
    Valid,
    Invalid,
    /// The evaluator reply was neither "Valid" nor "Invalid".
    Unknown,
}

impl Validation {
    /// Interpret an evaluator reply.
    ///
    /// Surrounding whitespace, quotes and punctuation are ignored and the
    /// comparison is case-insensitive. Anything else is [`Validation::Unknown`].
    pub fn parse(reply: &str) -> Self {
        let word = reply.trim_matches(|c: char| {
            c.is_whitespace() || matches!(c, '"' | '\'' | '`' | '“' | '”' | '.' | '!' | '*')
        });
        if word.eq_ignore_ascii_case("valid") {
            Self::Valid
        } else if word.eq_ignore_ascii_case("invalid") {
            Self::Invalid
        } else {
            Self::Unknown
        }
    }
}

impl std::fmt::Display for Validation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Valid => "Valid",
            Self::Invalid => "Invalid",
            Self::Unknown => "Unknown",
        })
    }
}

/// The answer returned to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    /// Verdict on the first generated answer.
    pub validation: Validation,
    /// Whether the answer was regenerated after a non-`Valid` verdict.
    pub regenerated: bool,
}

fn validation_prompt(context: &str, answer: &str) -> String {
    format!(
        r#"You are a critical and precise evaluator.

Your task is to validate whether the following generated responses are:
1. Factually supported by the information in the given question-context pairs.
2. Free from hallucinated or made-up information.
3. Relevant to each question and its context.

Instructions:
- Carefully compare the response to the matching context.
- If all answers are factually grounded and fully supported by the context, respond with: "Valid".
- If any answer contains unsupported, irrelevant, or made-up content, respond with: "Invalid".
- Do NOT explain or include anything other than the word "Valid" or "Invalid".

Question-Context Pairs:
{context}

Generated Response:
{answer}"#
    )
}

/// Asks the generator whether an answer is grounded in its context.
#[derive(Clone)]
pub struct AnswerValidator {
    generator: Arc<dyn Generator>,
    temperature: f32,
    max_tokens: u32,
}

impl std::fmt::Debug for AnswerValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerValidator")
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}

impl AnswerValidator {
    pub fn new(generator: Arc<dyn Generator>, temperature: f32, max_tokens: u32) -> Self {
        Self { generator, temperature, max_tokens }
    }

    /// Validate `answer` against `payload`.
    ///
    /// # Errors
    ///
    /// Propagates generator failures. An unparsable reply is
    /// [`Validation::Unknown`], not an error.
    pub async fn validate(&self, payload: &ContextPayload, answer: &str) -> Result<Validation> {
        let request = GenerationRequest::prompt(
            validation_prompt(payload.text.trim(), answer),
            self.max_tokens,
            self.temperature,
        );
        let reply = self.generator.generate(request).await?;
        let verdict = Validation::parse(&reply);
        debug!(%verdict, reply = reply.trim(), "validated answer");
        Ok(verdict)
    }
}
