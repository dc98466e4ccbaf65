//! LLM semantic aligner.
//!
//! Batches candidates into single prompts asking a chat model to rate
//! the 0.0-1.0 relevance of each text to the term and definition,
//! returned as a JSON array indexed by position in the batch.
//!
//! The most accurate strategy, and the only one with real latency and
//! cost. Request failures are retried per batch with exponential
//! backoff; exhausted retries degrade that batch to "no opinion". The
//! ensemble must function correctly with this aligner disabled
//! entirely.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use super::{clamp_score, truncate_chars, AlignmentResult};
use crate::error::Result;
use crate::traits::ai::{ChatModel, ChatParams};
use crate::types::candidate::{AlignCandidate, PoolKind};
use crate::types::config::LlmConfig;

/// Method name attached to results from this aligner.
pub const LLM_METHOD: &str = "llm_semantic";

/// Maximum characters of candidate text embedded in a prompt.
const MAX_PROMPT_CHARS: usize = 300;

/// Maximum characters of definition embedded in a prompt.
const MAX_DEFINITION_CHARS: usize = 500;

/// Initial backoff after a failed batch request.
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

const SYSTEM_PROMPT: &str = "You are an expert economist rating the relevance of texts to economic concepts.";

/// Batched LLM semantic-judgment strategy.
pub struct LlmAligner {
    config: LlmConfig,
    chat: Option<Arc<dyn ChatModel>>,
}

impl LlmAligner {
    /// Create from configuration and an optional chat provider.
    ///
    /// When the strategy is enabled but no provider is wired in (for
    /// example, missing credentials at startup), the aligner disables
    /// itself and logs a warning rather than failing the run.
    pub fn new(config: LlmConfig, chat: Option<Arc<dyn ChatModel>>) -> Self {
        if config.enabled && chat.is_none() {
            warn!("LLM strategy enabled but no chat provider configured; disabling it for this run");
        }
        Self { config, chat }
    }

    /// Whether this strategy participates in the ensemble.
    pub fn enabled(&self) -> bool {
        self.config.enabled && self.chat.is_some()
    }

    /// Ensemble contribution weight.
    pub fn weight(&self) -> f64 {
        self.config.weight
    }

    /// Provider availability check. Idempotent.
    pub fn ensure_ready(&self) -> Result<()> {
        Ok(())
    }

    /// Score candidates in batches. Never errors: failed batches simply
    /// produce no results.
    pub async fn align(
        &self,
        term: &str,
        definition: &str,
        candidates: &[AlignCandidate],
        pool: PoolKind,
    ) -> Vec<AlignmentResult> {
        let Some(chat) = &self.chat else {
            return Vec::new();
        };
        if candidates.is_empty() {
            return Vec::new();
        }

        let batch_size = self.config.batch_size.max(1);
        let mut results = Vec::new();
        let batches: Vec<&[AlignCandidate]> = candidates.chunks(batch_size).collect();
        let batch_count = batches.len();

        for (i, batch) in batches.into_iter().enumerate() {
            results.extend(self.process_batch(chat.as_ref(), term, definition, batch, pool).await);

            // Fixed inter-batch delay as a basic rate limiter
            if i + 1 < batch_count {
                tokio::time::sleep(Duration::from_millis(self.config.batch_delay_ms)).await;
            }
        }

        results
    }

    /// One prompt round-trip for a batch, with bounded retries.
    async fn process_batch(
        &self,
        chat: &dyn ChatModel,
        term: &str,
        definition: &str,
        batch: &[AlignCandidate],
        pool: PoolKind,
    ) -> Vec<AlignmentResult> {
        let prompt = build_prompt(term, definition, batch, pool);
        let params = ChatParams {
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let mut backoff = INITIAL_BACKOFF;
        for attempt in 0..=self.config.max_retries {
            match chat.complete(SYSTEM_PROMPT, &prompt, &params).await {
                Ok(response) => {
                    let parsed = parse_batch_response(&response, batch);
                    debug!(
                        batch_len = batch.len(),
                        parsed = parsed.len(),
                        pool = %pool,
                        "LLM batch scored"
                    );
                    return parsed;
                }
                Err(e) if attempt < self.config.max_retries => {
                    warn!(attempt, error = %e, "LLM batch request failed, retrying");
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
                Err(e) => {
                    warn!(error = %e, "LLM batch request failed, no scores for this batch");
                }
            }
        }

        Vec::new()
    }
}

/// Build the user prompt for one batch.
fn build_prompt(term: &str, definition: &str, batch: &[AlignCandidate], pool: PoolKind) -> String {
    let pool_desc = match pool {
        PoolKind::Policy => "policy paragraph",
        PoolKind::Sentiment => "news article",
    };

    let mut prompt = format!(
        "Rate how relevant each {pool_desc} is to the economic concept \"{term}\".\n\n\
         **Concept Definition:**\n{}\n\n\
         **Scoring Guidelines:**\n\
         - 0.9-1.0: Directly discusses or defines this concept\n\
         - 0.7-0.9: Strongly related, mentions the concept in context\n\
         - 0.5-0.7: Somewhat related, touches on related themes\n\
         - 0.3-0.5: Weakly related, tangential connection\n\
         - 0.0-0.3: Not related or only superficially mentions keywords\n\n\
         **Texts to evaluate:**\n",
        truncate_chars(definition, MAX_DEFINITION_CHARS)
    );

    for (i, candidate) in batch.iter().enumerate() {
        prompt.push_str(&format!(
            "\n[{i}] {}\n",
            truncate_chars(&candidate.text, MAX_PROMPT_CHARS)
        ));
    }

    prompt.push_str(
        "\n**Response Format:**\n\
         Return a JSON array with your ratings. Each item must have:\n\
         - \"index\": the text index number\n\
         - \"score\": relevance score (0.0 to 1.0)\n\
         - \"reason\": brief explanation (max 20 words)\n\n\
         Example: [{\"index\": 0, \"score\": 0.85, \"reason\": \"Directly discusses inflation trends\"}]\n\n\
         **Your JSON response:**",
    );

    prompt
}

/// Parse a model response into results.
///
/// Tolerates markdown code fences, prose around the JSON array, and
/// partially malformed items (unparseable items are skipped, the rest
/// kept). Out-of-range indices are dropped.
fn parse_batch_response(response: &str, batch: &[AlignCandidate]) -> Vec<AlignmentResult> {
    let text = response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let (Some(start), Some(end)) = (text.find('['), text.rfind(']')) else {
        warn!("no JSON array in LLM response");
        return Vec::new();
    };
    if end < start {
        warn!("no JSON array in LLM response");
        return Vec::new();
    }

    let items: Vec<Value> = match serde_json::from_str(&text[start..=end]) {
        Ok(items) => items,
        Err(e) => {
            warn!(error = %e, "failed to parse LLM response JSON");
            return Vec::new();
        }
    };

    items
        .into_iter()
        .filter_map(|item| {
            let index = item.get("index")?.as_u64()? as usize;
            let score = item.get("score")?.as_f64()?;
            let candidate = batch.get(index)?;

            let mut result =
                AlignmentResult::new(candidate.id, clamp_score(score), LLM_METHOD);
            if let Some(reason) = item.get("reason").and_then(Value::as_str) {
                result = result.with_reason(reason);
            }
            Some(result)
        })
        .collect()
}
