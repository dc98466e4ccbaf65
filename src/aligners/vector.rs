//! Vector similarity aligner.
//!
//! Encodes `"{term}: {definition}"` as the query and each candidate's
//! combined text as documents, in one batch, then scores by cosine
//! similarity. Fast and multilingual, but may miss semantic equivalents
//! with very different wording.
//!
//! Any provider failure (model not loadable, encode error) degrades to
//! an empty result list after a warning; alignment continues on the
//! remaining strategies.

use std::sync::Arc;

use serde_json::json;
use tracing::warn;

use super::{clamp_score, truncate_chars, AlignmentResult};
use crate::error::Result;
use crate::traits::embedder::{cosine_similarity, Embedder};
use crate::types::candidate::{AlignCandidate, PoolKind};
use crate::types::config::VectorConfig;

/// Method name attached to results from this aligner.
pub const VECTOR_METHOD: &str = "vector_similarity";

/// Maximum characters of query/document text sent to the embedder.
const MAX_ENCODE_CHARS: usize = 500;

/// Embedding cosine-similarity scoring strategy.
pub struct VectorAligner {
    config: VectorConfig,
    embedder: Arc<dyn Embedder>,
}

impl VectorAligner {
    /// Create from configuration and an embedding provider.
    pub fn new(config: VectorConfig, embedder: Arc<dyn Embedder>) -> Self {
        Self { config, embedder }
    }

    /// Whether this strategy participates in the ensemble.
    pub fn enabled(&self) -> bool {
        self.config.enabled
    }

    /// Ensemble contribution weight.
    pub fn weight(&self) -> f64 {
        self.config.weight
    }

    /// Trigger the provider's one-time model load. Idempotent.
    pub async fn ensure_ready(&self) -> Result<()> {
        self.embedder.ensure_ready().await
    }

    /// Score all candidates by embedding similarity to the term query.
    pub async fn align(
        &self,
        term: &str,
        definition: &str,
        candidates: &[AlignCandidate],
        _pool: PoolKind,
    ) -> Vec<AlignmentResult> {
        if candidates.is_empty() {
            return Vec::new();
        }

        if let Err(e) = self.embedder.ensure_ready().await {
            warn!(model = self.embedder.model(), error = %e, "embedding model unavailable, skipping vector alignment");
            return Vec::new();
        }

        let query = format!("{term}: {}", truncate_chars(definition, MAX_ENCODE_CHARS));

        // Query first, candidates after, all in one batch.
        let mut texts = Vec::with_capacity(candidates.len() + 1);
        texts.push(query);
        for candidate in candidates {
            texts.push(truncate_chars(&candidate.full_text(), MAX_ENCODE_CHARS).to_string());
        }

        let embeddings = match self.embedder.encode(&texts).await {
            Ok(embeddings) if embeddings.len() == texts.len() => embeddings,
            Ok(embeddings) => {
                warn!(
                    expected = texts.len(),
                    got = embeddings.len(),
                    "embedder returned wrong batch size, skipping vector alignment"
                );
                return Vec::new();
            }
            Err(e) => {
                warn!(error = %e, "embedding failed, skipping vector alignment");
                return Vec::new();
            }
        };

        let query_embedding = &embeddings[0];

        candidates
            .iter()
            .zip(&embeddings[1..])
            .map(|(candidate, embedding)| {
                let raw = cosine_similarity(query_embedding, embedding) as f64;
                AlignmentResult::new(candidate.id, clamp_score(raw), VECTOR_METHOD)
                    .with_metadata("raw_similarity", json!(raw))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::error::AlignmentError;

    /// Embedder that maps texts to fixed vectors by substring.
    struct StaticEmbedder {
        entries: Vec<(&'static str, Vec<f32>)>,
        fail: bool,
    }

    #[async_trait]
    impl Embedder for StaticEmbedder {
        async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            if self.fail {
                return Err(AlignmentError::Embedding("model load failed".to_string()));
            }
            Ok(texts
                .iter()
                .map(|t| {
                    self.entries
                        .iter()
                        .find(|(key, _)| t.contains(key))
                        .map(|(_, v)| v.clone())
                        .unwrap_or_else(|| vec![0.0, 0.0, 1.0])
                })
                .collect())
        }

        fn model(&self) -> &str {
            "static-test"
        }
    }

    fn aligner(entries: Vec<(&'static str, Vec<f32>)>, fail: bool) -> VectorAligner {
        VectorAligner::new(
            VectorConfig::default(),
            Arc::new(StaticEmbedder { entries, fail }),
        )
    }

    #[tokio::test]
    async fn test_ranks_by_cosine() {
        let a = aligner(
            vec![
                ("inflation", vec![1.0, 0.0, 0.0]),
                ("close", vec![0.9, 0.1, 0.0]),
                ("far", vec![0.0, 1.0, 0.0]),
            ],
            false,
        );

        let candidates = vec![
            AlignCandidate::new(1, "close match text"),
            AlignCandidate::new(2, "far away text"),
        ];

        let results = a
            .align("inflation", "rising prices", &candidates, PoolKind::Policy)
            .await;

        assert_eq!(results.len(), 2);
        assert!(results[0].score > 0.9);
        assert!(results[1].score < 0.1);
        assert!(results.iter().all(|r| (0.0..=1.0).contains(&r.score)));
    }

    #[tokio::test]
    async fn test_provider_failure_degrades_to_empty() {
        let a = aligner(vec![], true);
        let candidates = vec![AlignCandidate::new(1, "text")];
        let results = a
            .align("inflation", "def", &candidates, PoolKind::Policy)
            .await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_empty_candidates() {
        let a = aligner(vec![], false);
        let results = a.align("inflation", "def", &[], PoolKind::Policy).await;
        assert!(results.is_empty());
    }
}
