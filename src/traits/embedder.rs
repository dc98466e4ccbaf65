//! Embedder trait for sentence embeddings.

use async_trait::async_trait;

use crate::error::Result;

/// Batched sentence embedding provider.
///
/// Implementations must be deterministic for a fixed model version.
/// Local-inference implementations should run the encode step on a
/// blocking thread (`tokio::task::spawn_blocking`) so it does not stall
/// concurrent I/O-bound work.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Perform any one-time model load. Idempotent; safe to call
    /// repeatedly. The default implementation is a no-op for providers
    /// with no local state.
    async fn ensure_ready(&self) -> Result<()> {
        Ok(())
    }

    /// Encode a batch of texts into vectors.
    ///
    /// Returns one vector per input text, in input order.
    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Identifier of the underlying model, for logging.
    fn model(&self) -> &str;
}

/// Cosine similarity between two vectors.
///
/// Returns 0.0 when either vector has zero magnitude or lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity_identical() {
        let v = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_degenerate() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }
}
