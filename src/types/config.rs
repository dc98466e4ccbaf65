//! Configuration types for the alignment engine.
//!
//! Defaults mirror the production configuration: the LLM strategy is
//! disabled until a provider is wired in, vector and rule strategies are
//! on. All types deserialize from plain JSON so callers can load them
//! however they load the rest of their configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the rule-based keyword strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Whether this strategy contributes to the ensemble
    pub enabled: bool,

    /// Ensemble contribution weight
    pub weight: f64,

    /// Agreement threshold used by the ensemble bonus count
    pub threshold: f64,

    /// Score singular/plural, suffix, and hyphen/space term variants
    pub use_fuzzy: bool,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            weight: 0.20,
            threshold: 0.60,
            use_fuzzy: true,
        }
    }
}

/// Configuration for the embedding similarity strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorConfig {
    /// Whether this strategy contributes to the ensemble
    pub enabled: bool,

    /// Ensemble contribution weight
    pub weight: f64,

    /// Agreement threshold used by the ensemble bonus count
    pub threshold: f64,

    /// Embedding model identifier (provider-specific)
    pub model: String,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            weight: 0.30,
            threshold: 0.65,
            model: "text-embedding-3-small".to_string(),
        }
    }
}

/// Configuration for the LLM semantic-judgment strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Whether this strategy contributes to the ensemble
    pub enabled: bool,

    /// Ensemble contribution weight
    pub weight: f64,

    /// Agreement threshold used by the ensemble bonus count
    pub threshold: f64,

    /// Chat model identifier (provider-specific)
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum completion tokens per batch call
    pub max_tokens: u32,

    /// Candidates per prompt
    pub batch_size: usize,

    /// Fixed delay between batches, in milliseconds
    pub batch_delay_ms: u64,

    /// Retries per batch before degrading to "no opinion"
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            weight: 0.50,
            threshold: 0.70,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.1,
            max_tokens: 1000,
            batch_size: 10,
            batch_delay_ms: 500,
            max_retries: 2,
        }
    }
}

/// Configuration for the ensemble combine step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridConfig {
    /// A method score at or above this counts as an agreeing method
    pub threshold: f64,

    /// Fixed increment added when enough methods agree
    pub ensemble_bonus: f64,

    /// Minimum agreeing methods for the bonus
    pub min_agreement: usize,
}

impl Default for HybridConfig {
    fn default() -> Self {
        Self {
            threshold: 0.65,
            ensemble_bonus: 0.05,
            min_agreement: 2,
        }
    }
}

/// Run-global thresholds and caps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Ensemble results below this never become evidence
    pub min_final_score: f64,

    /// Evidence cap per cell, policy pool
    pub max_policy_evidence: usize,

    /// Evidence cap per cell, sentiment pool
    pub max_sentiment_evidence: usize,

    /// News search window, in days
    pub sentiment_time_window_days: u32,

    /// Candidate pre-filter limit, policy pool
    pub policy_search_limit: usize,

    /// Candidate pre-filter limit, sentiment pool
    pub sentiment_search_limit: usize,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            min_final_score: 0.65,
            max_policy_evidence: 15,
            max_sentiment_evidence: 30,
            sentiment_time_window_days: 90,
            policy_search_limit: 50,
            sentiment_search_limit: 100,
        }
    }
}

/// Full engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    /// LLM semantic strategy
    pub llm: LlmConfig,

    /// Embedding similarity strategy
    pub vector: VectorConfig,

    /// Keyword matching strategy
    pub rule: RuleConfig,

    /// Ensemble combine settings
    pub hybrid: HybridConfig,

    /// Run-global settings
    pub global: GlobalConfig,
}

impl AlignmentConfig {
    /// Create a config with the production defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the global minimum final score.
    pub fn with_min_final_score(mut self, score: f64) -> Self {
        self.global.min_final_score = score;
        self
    }

    /// Set the per-cell evidence caps.
    pub fn with_evidence_caps(mut self, policy: usize, sentiment: usize) -> Self {
        self.global.max_policy_evidence = policy;
        self.global.max_sentiment_evidence = sentiment;
        self
    }

    /// Enable the LLM strategy.
    pub fn with_llm_enabled(mut self, enabled: bool) -> Self {
        self.llm.enabled = enabled;
        self
    }

    /// Disable the vector strategy.
    pub fn without_vector(mut self) -> Self {
        self.vector.enabled = false;
        self
    }

    /// Disable the rule strategy.
    pub fn without_rule(mut self) -> Self {
        self.rule.enabled = false;
        self
    }
}
