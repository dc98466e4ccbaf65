//! Provider implementations for the chat and embedding traits.

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "openai")]
pub use openai::OpenAiClient;
