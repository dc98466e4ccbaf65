//! ChatModel trait for LLM operations.
//!
//! The LLM aligner only needs one capability from a provider: a
//! chat-completion call taking a system and user prompt and returning
//! free-form text. Implementations wrap specific providers (OpenAI,
//! Anthropic, local models) and handle transport specifics.

use async_trait::async_trait;

use crate::error::Result;

/// Sampling parameters for a chat-completion call.
#[derive(Debug, Clone)]
pub struct ChatParams {
    /// Sampling temperature (alignment scoring wants it low)
    pub temperature: f32,

    /// Maximum tokens in the completion
    pub max_tokens: u32,
}

impl Default for ChatParams {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_tokens: 1000,
        }
    }
}

/// Chat-completion provider.
///
/// The returned text is free-form; callers are responsible for parsing
/// any structured content out of it.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Run a single chat completion.
    async fn complete(&self, system: &str, user: &str, params: &ChatParams) -> Result<String>;

    /// Identifier of the underlying model, for logging.
    fn model(&self) -> &str;
}
