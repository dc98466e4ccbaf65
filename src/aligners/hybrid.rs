//! Hybrid ensemble aligner.
//!
//! Runs every enabled strategy over the same candidates, then combines
//! per-candidate scores into one final ranked list:
//!
//! 1. Weighted mean over the methods that actually scored the candidate
//!    (missing methods do not count against it and do not contribute 0).
//! 2. A fixed bonus when at least `min_agreement` methods score at or
//!    above the ensemble threshold.
//!
//! Weighting by configured per-method weight keeps the ensemble stable
//! when one strategy is disabled or transiently fails: trust
//! redistributes over whichever signals are present. The agreement
//! bonus rewards independent corroboration over a single very-confident
//! method, since the three strategies have uncorrelated failure modes.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use serde_json::{json, Map, Value};
use tracing::warn;

use super::{truncate_chars, AlignmentResult, LlmAligner, RuleAligner, Strategy, VectorAligner};
use crate::error::Result;
use crate::traits::ai::ChatModel;
use crate::traits::embedder::Embedder;
use crate::types::candidate::{AlignCandidate, PoolKind};
use crate::types::config::{AlignmentConfig, HybridConfig};

/// Method name attached to ensemble results.
pub const HYBRID_METHOD: &str = "hybrid_ensemble";

/// Maximum characters of concatenated child reasons.
const MAX_REASON_CHARS: usize = 200;

/// Weighted-vote ensemble over the configured strategies.
pub struct HybridAligner {
    strategies: Vec<Strategy>,
    config: HybridConfig,
}

impl HybridAligner {
    /// Create an empty ensemble.
    pub fn new(config: HybridConfig) -> Self {
        Self {
            strategies: Vec::new(),
            config,
        }
    }

    /// Add a strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategies.push(strategy);
        self
    }

    /// Build the default ensemble from configuration and whichever
    /// providers are available. A strategy whose provider is missing is
    /// left out with a warning; the ensemble degrades to the rest.
    pub fn from_config(
        config: &AlignmentConfig,
        chat: Option<Arc<dyn ChatModel>>,
        embedder: Option<Arc<dyn Embedder>>,
    ) -> Self {
        let mut ensemble = Self::new(config.hybrid.clone())
            .with_strategy(Strategy::Rule(RuleAligner::new(config.rule.clone())));

        match embedder {
            Some(embedder) => {
                ensemble = ensemble.with_strategy(Strategy::Vector(VectorAligner::new(
                    config.vector.clone(),
                    embedder,
                )));
            }
            None if config.vector.enabled => {
                warn!("vector strategy enabled but no embedder configured; disabling it for this run");
            }
            None => {}
        }

        ensemble.with_strategy(Strategy::Llm(LlmAligner::new(config.llm.clone(), chat)))
    }

    /// The configured strategies.
    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    /// Run one-time setup for every enabled strategy. Idempotent.
    pub async fn ensure_ready(&self) -> Result<()> {
        for strategy in self.strategies.iter().filter(|s| s.enabled()) {
            strategy.ensure_ready().await?;
        }
        Ok(())
    }

    /// Run every enabled strategy and combine their scores.
    ///
    /// Returns exactly one result per input candidate: candidates no
    /// strategy scored come back with score 0.0 and an empty score map.
    pub async fn align(
        &self,
        term: &str,
        definition: &str,
        candidates: &[AlignCandidate],
        pool: PoolKind,
    ) -> Vec<AlignmentResult> {
        if candidates.is_empty() {
            return Vec::new();
        }

        let enabled: Vec<&Strategy> = self.strategies.iter().filter(|s| s.enabled()).collect();

        // The strategies are independent; run them concurrently.
        let outputs = join_all(
            enabled
                .iter()
                .map(|s| s.align(term, definition, candidates, pool)),
        )
        .await;

        let per_method: Vec<MethodOutput> = enabled
            .iter()
            .zip(outputs)
            .map(|(strategy, results)| MethodOutput {
                key: strategy.key(),
                weight: strategy.weight(),
                results,
            })
            .collect();

        combine_results(candidates, &per_method, &self.config)
    }
}

/// One enabled strategy's scored output.
struct MethodOutput {
    key: &'static str,
    weight: f64,
    results: Vec<AlignmentResult>,
}

/// Combine per-method results into one ensemble result per candidate.
fn combine_results(
    candidates: &[AlignCandidate],
    per_method: &[MethodOutput],
    config: &HybridConfig,
) -> Vec<AlignmentResult> {
    // Index scores and reasons by candidate id
    let mut scores: HashMap<i64, Vec<(&'static str, f64, f64)>> = HashMap::new();
    let mut reasons: HashMap<i64, Vec<String>> = HashMap::new();

    for method in per_method {
        for result in &method.results {
            scores
                .entry(result.candidate_id)
                .or_default()
                .push((method.key, method.weight, result.score));
            if let Some(reason) = &result.reason {
                reasons
                    .entry(result.candidate_id)
                    .or_default()
                    .push(format!("{}: {}", method.key, reason));
            }
        }
    }

    candidates
        .iter()
        .map(|candidate| {
            let Some(method_scores) = scores.get(&candidate.id) else {
                // No strategy scored this candidate
                return AlignmentResult::new(candidate.id, 0.0, HYBRID_METHOD)
                    .with_metadata("individual_scores", Value::Object(Map::new()));
            };

            let total_weight: f64 = method_scores.iter().map(|(_, w, _)| w).sum();
            let weighted_sum: f64 = method_scores.iter().map(|(_, w, s)| w * s).sum();
            let base = if total_weight > 0.0 {
                weighted_sum / total_weight
            } else {
                0.0
            };

            let agreeing = method_scores
                .iter()
                .filter(|(_, _, s)| *s >= config.threshold)
                .count();
            let bonus_applied = agreeing >= config.min_agreement;
            let bonus = if bonus_applied {
                config.ensemble_bonus
            } else {
                0.0
            };

            let mut individual = Map::new();
            for (key, _, score) in method_scores {
                individual.insert(key.to_string(), json!(score));
            }

            let mut result = AlignmentResult::new(candidate.id, (base + bonus).min(1.0), HYBRID_METHOD)
                .with_metadata("individual_scores", Value::Object(individual))
                .with_metadata("agreeing_methods", json!(agreeing))
                .with_metadata("ensemble_bonus_applied", json!(bonus_applied));

            if let Some(parts) = reasons.get(&candidate.id) {
                result = result.with_reason(truncate_chars(&parts.join("; "), MAX_REASON_CHARS));
            }

            result
        })
        .collect()
}
