//! Alignment strategies and their shared result type.
//!
//! Three independent strategies score the same candidates against the
//! same term, and the hybrid ensemble combines them:
//! - [`RuleAligner`] - deterministic keyword/Jaccard scoring
//! - [`VectorAligner`] - embedding cosine similarity
//! - [`LlmAligner`] - batched LLM semantic judgment
//! - [`HybridAligner`] - weighted combination with an agreement bonus
//!
//! The strategies form a closed set, dispatched through the [`Strategy`]
//! enum; provider backends stay pluggable behind the `ChatModel` and
//! `Embedder` traits.

pub mod hybrid;
pub mod llm;
pub mod rule;
pub mod vector;

pub use hybrid::{HybridAligner, HYBRID_METHOD};
pub use llm::LlmAligner;
pub use rule::RuleAligner;
pub use vector::VectorAligner;

use serde_json::{Map, Value};

use crate::error::Result;
use crate::types::candidate::{AlignCandidate, PoolKind};

/// Result of scoring one candidate with one method.
#[derive(Debug, Clone)]
pub struct AlignmentResult {
    /// Id of the scored candidate; always one of the input ids
    pub candidate_id: i64,

    /// Relevance score, clamped to [0, 1]
    pub score: f64,

    /// Method name (e.g. "rule_keyword", "hybrid_ensemble")
    pub method: String,

    /// Short human-readable justification
    pub reason: Option<String>,

    /// Method-specific details
    pub metadata: Map<String, Value>,
}

impl AlignmentResult {
    /// Create a result with the score clamped to [0, 1].
    pub fn new(candidate_id: i64, score: f64, method: impl Into<String>) -> Self {
        Self {
            candidate_id,
            score: clamp_score(score),
            method: method.into(),
            reason: None,
            metadata: Map::new(),
        }
    }

    /// Attach a reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Read one method's score out of an ensemble result's
    /// `individual_scores` metadata. Returns `None` for results that are
    /// not from the ensemble or where the method had no opinion.
    pub fn individual_score(&self, method_key: &str) -> Option<f64> {
        self.metadata
            .get("individual_scores")
            .and_then(|scores| scores.get(method_key))
            .and_then(Value::as_f64)
    }
}

/// Clamp a score into [0, 1]. NaN maps to 0.
pub(crate) fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, 1.0)
}

/// Truncate a string to at most `max` characters, on a char boundary.
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// A configured alignment strategy.
///
/// The set of strategies is closed: the ensemble dispatches over this
/// enum rather than any dynamic plugin discovery. Individual strategies
/// never fail out of `align` - a strategy that cannot score a batch
/// returns no results for it, and the caller treats a missing candidate
/// id as "no opinion" rather than a zero score.
pub enum Strategy {
    /// Deterministic keyword matching
    Rule(RuleAligner),

    /// Embedding cosine similarity
    Vector(VectorAligner),

    /// Batched LLM judgment
    Llm(LlmAligner),
}

impl Strategy {
    /// Short stable key, used in ensemble score maps ("rule", "vector",
    /// "llm").
    pub fn key(&self) -> &'static str {
        match self {
            Strategy::Rule(_) => "rule",
            Strategy::Vector(_) => "vector",
            Strategy::Llm(_) => "llm",
        }
    }

    /// Whether this strategy participates in the ensemble.
    pub fn enabled(&self) -> bool {
        match self {
            Strategy::Rule(a) => a.enabled(),
            Strategy::Vector(a) => a.enabled(),
            Strategy::Llm(a) => a.enabled(),
        }
    }

    /// Ensemble contribution weight.
    pub fn weight(&self) -> f64 {
        match self {
            Strategy::Rule(a) => a.weight(),
            Strategy::Vector(a) => a.weight(),
            Strategy::Llm(a) => a.weight(),
        }
    }

    /// Perform any one-time setup (model loads, credential checks).
    /// Idempotent; safe to call repeatedly.
    pub async fn ensure_ready(&self) -> Result<()> {
        match self {
            Strategy::Rule(_) => Ok(()),
            Strategy::Vector(a) => a.ensure_ready().await,
            Strategy::Llm(a) => a.ensure_ready(),
        }
    }

    /// Score candidates against a term. May return fewer results than
    /// candidates; never errors.
    pub async fn align(
        &self,
        term: &str,
        definition: &str,
        candidates: &[AlignCandidate],
        pool: PoolKind,
    ) -> Vec<AlignmentResult> {
        match self {
            Strategy::Rule(a) => a.align(term, definition, candidates, pool),
            Strategy::Vector(a) => a.align(term, definition, candidates, pool).await,
            Strategy::Llm(a) => a.align(term, definition, candidates, pool).await,
        }
    }
}
