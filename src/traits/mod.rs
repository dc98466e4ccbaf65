//! Core trait abstractions.
//!
//! These traits define the extension points of the library:
//! - [`ai::ChatModel`] - chat-completion provider for the LLM aligner
//! - [`embedder::Embedder`] - sentence embedding provider for the vector aligner
//! - [`source::CandidateSource`] - candidate pre-filter search

pub mod ai;
pub mod embedder;
pub mod source;
