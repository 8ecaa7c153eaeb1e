//! Generator trait for text generation services.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The author of a [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message of a generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// A user-authored message.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    /// A system instruction.
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }
}

/// A complete, self-contained generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Full message history; generators keep no state between calls.
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl GenerationRequest {
    /// A request holding a single user prompt.
    pub fn prompt(prompt: impl Into<String>, max_tokens: u32, temperature: f32) -> Self {
        Self { messages: vec![Message::user(prompt)], max_tokens, temperature }
    }
}

/// A stateless text generation service.
///
/// Errors should be reported as [`RagError::GenerationFailure`](crate::RagError).
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a completion for the request and return its text.
    async fn generate(&self, request: GenerationRequest) -> Result<String>;
}
