//! Answer generation from an assembled context.

use std::sync::Arc;

use tracing::debug;

use crate::context::ContextPayload;
use crate::error::Result;
use crate::generator::{GenerationRequest, Generator};

/// Sentence the generator is told to use when a context cannot support an answer.
pub const INFORMATION_NOT_AVAILABLE: &str = "Information not available for the given title: The provided context does not contain sufficient details to answer this question.";

fn answer_prompt(context: &str) -> String {
    format!(
        "You are a helpful and concise AI assistant. Your task is to generate informative and structured answers based solely on the paired context for each user question.

Instructions:
- Each question is followed by its corresponding context.
- Answer each question independently.
- Do NOT include or repeat the question in your response.
- Begin each answer with a short, descriptive title (do NOT prefix it with \"Title:\", \"Question [No]:\").
- On the line below the title, provide the most complete and accurate answer using only the provided context.
- You may synthesize or paraphrase the context to form a complete answer.
- Use logical inference if necessary, but do NOT introduce facts not supported or implied by the context.
- Structure the answer using bullet points or numbered lists if helpful.
- If the context lacks enough information to generate a meaningful response, write:
  {INFORMATION_NOT_AVAILABLE}

Now process the following question-context pairs:

{context}"
    )
}

/// Produces an answer grounded in a [`ContextPayload`].
#[derive(Clone)]
pub struct AnswerGenerator {
    generator: Arc<dyn Generator>,
    temperature: f32,
    max_tokens: u32,
}

impl std::fmt::Debug for AnswerGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerGenerator")
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}

impl AnswerGenerator {
    pub fn new(generator: Arc<dyn Generator>, temperature: f32, max_tokens: u32) -> Self {
        Self { generator, temperature, max_tokens }
    }

    /// Generate an answer for every question in the payload.
    pub async fn generate(&self, payload: &ContextPayload) -> Result<String> {
        let request =
            GenerationRequest::prompt(answer_prompt(&payload.text), self.max_tokens, self.temperature);
        let answer = self.generator.generate(request).await?;
        debug!(answer_len = answer.len(), "generated answer");
        Ok(answer)
    }
}
