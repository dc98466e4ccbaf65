//! Multi-Strategy Alignment Engine
//!
//! Fuses three heterogeneous corpora into per-term Knowledge Cells:
//! multilingual term definitions, central-bank policy paragraphs, and
//! sentiment-annotated news articles. Each candidate is scored by up to
//! three independent strategies and accepted or rejected by a weighted
//! ensemble vote.
//!
//! # Strategies
//!
//! - Rule: deterministic keyword/Jaccard matching, no external calls
//! - Vector: embedding cosine similarity via an [`traits::embedder::Embedder`]
//! - LLM: batched semantic relevance scoring via a [`traits::ai::ChatModel`]
//!
//! The ensemble takes a weighted mean over whichever strategies scored a
//! candidate and adds a small bonus when several agree, so losing a
//! provider degrades scores gracefully instead of zeroing them.
//!
//! # Usage
//!
//! ```rust,ignore
//! use alignment::{AlignmentConfig, AlignmentEngine, MemorySource, Term};
//!
//! let source = MemorySource::new()
//!     .with_policy(policy_paragraphs)
//!     .with_news(news_articles);
//! let engine = AlignmentEngine::new(source, AlignmentConfig::default(), None, None);
//! let (cells, summary) = engine.run(&terms).await;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Provider and source abstractions (ChatModel, Embedder, CandidateSource)
//! - [`types`] - Terms, candidates, configuration, and the Knowledge Cell wire format
//! - [`aligners`] - The three strategies and the hybrid ensemble
//! - [`engine`] - Per-term orchestration and run summaries
//! - [`sources`] - Candidate source implementations
//! - [`export`] - JSONL, CSV, and quality-report exporters
//! - [`testing`] - Mock implementations for testing

pub mod aligners;
pub mod engine;
pub mod error;
pub mod export;
pub mod sources;
pub mod testing;
pub mod traits;
pub mod types;

#[cfg(feature = "openai")]
pub mod ai;

// Re-export core types at crate root
pub use aligners::{
    AlignmentResult, HybridAligner, LlmAligner, RuleAligner, Strategy, VectorAligner,
};
pub use engine::{AlignmentEngine, RunSummary};
pub use error::{AlignmentError, Result};
pub use sources::MemorySource;
pub use traits::{
    ai::{ChatModel, ChatParams},
    embedder::{cosine_similarity, Embedder},
    source::CandidateSource,
};
pub use types::{
    candidate::{AlignCandidate, NewsCandidate, PolicyCandidate, PoolKind},
    cell::{
        AlignmentScores, CellMetadata, KnowledgeCell, PolicyEvidence, QualityMetrics,
        SentimentEvidence, SentimentInfo, TermDefinition,
    },
    config::{
        AlignmentConfig, GlobalConfig, HybridConfig, LlmConfig, RuleConfig, VectorConfig,
    },
    term::{LocalizedTerm, Term},
};
